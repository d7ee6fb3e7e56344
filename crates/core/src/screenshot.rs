//! Screenshot capture: filename allocation plus pluggable image encoding.
//!
//! Platform image backends differ (a desktop build encodes PNG in-process,
//! a console port may hand the buffer to the OS bitmap API), so encoding is
//! a capability injected into [`Screenshots`] rather than a compile-time
//! branch. The portable [`PngEncoder`] is the default.

use crate::framebuffer::{Framebuffer, Pixmap};
use anyhow::Error;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tracing::{info, warn};

/// Highest probe index; 1000 screenshots per game, `000` through `999`.
const MAX_INDEX: u32 = 999;

#[derive(Debug, ThisError)]
pub enum ScreenshotError {
    #[error("no free screenshot slot left in {}", .0.display())]
    NoFreeSlot(PathBuf),
}

/// Writes a pixel buffer to a file at a fixed format.
pub trait ImageEncoder {
    fn write(&self, pixmap: &Pixmap, path: &Path) -> Result<(), Error>;
}

/// Portable PNG backend.
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn write(&self, pixmap: &Pixmap, path: &Path) -> Result<(), Error> {
        pixmap.save(&path.to_string_lossy())
    }
}

/// Allocates the next screenshot path for `game_name` inside `dir`.
///
/// Probes `<dir>/<game_name>.NNN.png` for the first unused index. The probe
/// is a plain existence check; the eventual create can still race an
/// external writer, which a front-end tolerates.
pub fn screenshot_path(dir: &Path, game_name: &str) -> Result<PathBuf, ScreenshotError> {
    for index in 0..=MAX_INDEX {
        let path = dir.join(format!("{}.{:03}.png", game_name, index));
        if !path.exists() {
            return Ok(path);
        }
    }

    warn!(dir = %dir.display(), game = game_name, "no screenshot filenames left");
    Err(ScreenshotError::NoFreeSlot(dir.to_path_buf()))
}

/// Screenshot front: a save directory and an encoder.
pub struct Screenshots {
    directory: PathBuf,
    encoder: Box<dyn ImageEncoder>,
}

impl Screenshots {
    pub fn new<P: Into<PathBuf>>(directory: P, encoder: Box<dyn ImageEncoder>) -> Screenshots {
        Screenshots {
            directory: directory.into(),
            encoder,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `pixmap` to the next free slot and returns the path.
    ///
    /// A failed write removes the attempted file so a partial image is never
    /// left behind; the caller owns user-visible messaging.
    pub fn save(&self, pixmap: &Pixmap, game_name: &str) -> Result<PathBuf, Error> {
        fs::create_dir_all(&self.directory)?;
        let path = screenshot_path(&self.directory, game_name)?;

        if let Err(e) = self.encoder.write(pixmap, &path) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Samples;
    use anyhow::format_err;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, game: &str, index: u32) {
        fs::write(dir.join(format!("{}.{:03}.png", game, index)), b"").unwrap();
    }

    #[test]
    fn empty_directory_yields_index_zero() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let path = screenshot_path(temp_dir.path(), "alpha")?;
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("alpha.000.png")
        );
        Ok(())
    }

    #[test]
    fn probing_skips_existing_indices() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        for index in 0..=41 {
            touch(temp_dir.path(), "beta", index);
        }
        let path = screenshot_path(temp_dir.path(), "beta")?;
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("beta.042.png")
        );
        Ok(())
    }

    #[test]
    fn probing_is_per_game() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        touch(temp_dir.path(), "beta", 0);
        let path = screenshot_path(temp_dir.path(), "gamma")?;
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("gamma.000.png")
        );
        Ok(())
    }

    #[test]
    fn exhausted_slots_report_failure() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        for index in 0..=999 {
            touch(temp_dir.path(), "delta", index);
        }
        assert!(matches!(
            screenshot_path(temp_dir.path(), "delta"),
            Err(ScreenshotError::NoFreeSlot(_))
        ));
        Ok(())
    }

    #[test]
    fn save_writes_a_decodable_png() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let screenshots = Screenshots::new(temp_dir.path(), Box::new(PngEncoder));

        let pixmap = Pixmap::new(8, 8, Samples::Rgb);
        let path = screenshots.save(&pixmap, "epsilon")?;
        assert!(path.exists());

        let decoded = Pixmap::from_png(&path)?;
        assert_eq!(decoded.dims(), (8, 8));
        Ok(())
    }

    struct FailingEncoder;

    impl ImageEncoder for FailingEncoder {
        fn write(&self, _pixmap: &Pixmap, path: &Path) -> Result<(), Error> {
            // Leave a partial file behind, as an interrupted writer would.
            let mut file = File::create(path)?;
            file.write_all(b"\x89PNG")?;
            Err(format_err!("encoder exploded"))
        }
    }

    #[test]
    fn failed_write_removes_the_partial_file() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let screenshots = Screenshots::new(temp_dir.path(), Box::new(FailingEncoder));

        let pixmap = Pixmap::new(2, 2, Samples::Rgb);
        assert!(screenshots.save(&pixmap, "zeta").is_err());
        assert!(!temp_dir.path().join("zeta.000.png").exists());
        Ok(())
    }
}
