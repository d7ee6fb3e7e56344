//! Application settings, stored as a single TOML document.
//!
//! Hosts load the settings once at startup, hand them to [`Context`], and
//! persist them back on exit. Unknown keys are ignored and missing keys fall
//! back to defaults, so documents written by older builds keep loading.
//!
//! [`Context`]: crate::context::Context

use anyhow::{format_err, Context as ResultExt, Error};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_PATH: &str = "Settings.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Show the back button on the navigation bar when the stack is deep
    /// enough to go back.
    pub show_nav_back_button: bool,
    pub logging: LoggingSettings,
    pub screenshots: ScreenshotSettings,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            show_nav_back_button: true,
            logging: LoggingSettings::default(),
            screenshots: ScreenshotSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingSettings {
    pub enabled: bool,
    pub level: String,
    pub max_files: usize,
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> LoggingSettings {
        LoggingSettings {
            enabled: true,
            level: "info".to_string(),
            max_files: 3,
            directory: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScreenshotSettings {
    pub directory: PathBuf,
}

impl Default for ScreenshotSettings {
    fn default() -> ScreenshotSettings {
        ScreenshotSettings {
            directory: PathBuf::from("screenshots"),
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        let text = fs::read_to_string(path.as_ref())
            .with_context(|| format!("can't read settings file {}", path.as_ref().display()))?;
        toml::from_str(&text)
            .map_err(|e| format_err!("invalid settings file {}: {}", path.as_ref().display(), e))
    }

    /// Loads settings, falling back to defaults when the file is absent.
    ///
    /// A present-but-malformed file is still an error: silently replacing a
    /// document the user edited would lose their changes on the next save.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        if !path.as_ref().exists() {
            return Ok(Settings::default());
        }
        Settings::load(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let text = toml::to_string(self).context("can't serialize settings")?;
        fs::write(path.as_ref(), text)
            .with_context(|| format!("can't write settings file {}", path.as_ref().display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn settings_round_trip_preserves_values() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join(SETTINGS_PATH);

        let mut settings = Settings::default();
        settings.show_nav_back_button = false;
        settings.logging.level = "debug".to_string();
        settings.screenshots.directory = PathBuf::from("shots");
        settings.save(&path)?;

        let loaded = Settings::load(&path)?;
        assert!(!loaded.show_nav_back_button);
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.screenshots.directory, PathBuf::from("shots"));

        Ok(())
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let settings = Settings::load_or_default(temp_dir.path().join("absent.toml"))?;
        assert!(settings.show_nav_back_button);
        assert_eq!(settings.logging.max_files, 3);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_ignored() -> Result<(), Error> {
        let settings: Settings = toml::from_str(
            "show-nav-back-button = false\nfuture-flag = true\n\n[logging]\nlevel = \"warn\"\n",
        )?;
        assert!(!settings.show_nav_back_button);
        assert_eq!(settings.logging.level, "warn");
        Ok(())
    }
}
