use super::{Framebuffer, UpdateMode};
use crate::color::{Color, WHITE};
use crate::geom::{lerp, Rectangle};
use anyhow::{format_err, Context, Error};
use png::ColorType;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Number of color samples per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Samples {
    Grey,
    Rgb,
    Rgba,
}

impl Samples {
    pub fn count(self) -> usize {
        match self {
            Samples::Grey => 1,
            Samples::Rgb => 3,
            Samples::Rgba => 4,
        }
    }

    fn from_color_type(color_type: ColorType) -> Samples {
        match color_type {
            ColorType::Grayscale | ColorType::Indexed | ColorType::GrayscaleAlpha => Samples::Grey,
            ColorType::Rgb => Samples::Rgb,
            ColorType::Rgba => Samples::Rgba,
        }
    }

    fn color_type(self) -> ColorType {
        match self {
            Samples::Grey => ColorType::Grayscale,
            Samples::Rgb => ColorType::Rgb,
            Samples::Rgba => ColorType::Rgba,
        }
    }
}

/// An owned pixel buffer implementing [`Framebuffer`].
///
/// Serves three roles: the emulator's composited frame, the render target of
/// unit tests, and the source buffer handed to the screenshot encoder.
#[derive(Debug, Clone)]
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    pub samples: Samples,
    data: Vec<u8>,
}

impl Pixmap {
    pub fn new(width: u32, height: u32, samples: Samples) -> Pixmap {
        let len = samples.count() * (width * height) as usize;
        Pixmap {
            width,
            height,
            samples,
            data: vec![WHITE.gray(); len],
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn from_png<P: AsRef<Path>>(path: P) -> Result<Pixmap, Error> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("can't open PNG file {}", path.as_ref().display()))?;
        let decoder = png::Decoder::new(BufReader::new(file));
        let mut reader = decoder.read_info()?;
        let info = reader.info();
        let mut pixmap = Pixmap::new(
            info.width,
            info.height,
            Samples::from_color_type(info.color_type),
        );
        reader.next_frame(pixmap.data_mut())?;
        Ok(pixmap)
    }

    /// Expands a packed RGB565 frame into an 8-bit RGB pixmap.
    ///
    /// `pitch` is the source row stride in bytes, which may exceed
    /// `2 * width` when rows are padded. Channels widen by shifting into the
    /// upper bits (`r * 8`, `g * 4`, `b * 8`), matching what emulation cores
    /// expect of a 5/6/5 expansion.
    pub fn from_rgb565(frame: &[u8], width: u32, height: u32, pitch: usize) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height, Samples::Rgb);
        for y in 0..height {
            let row = &frame[y as usize * pitch..];
            for x in 0..width {
                let lo = row[2 * x as usize] as u16;
                let hi = row[2 * x as usize + 1] as u16;
                let value = hi << 8 | lo;
                let r = ((value >> 11) * 8) as u8;
                let g = (((value >> 5) & 0x3F) * 4) as u8;
                let b = ((value & 0x1F) * 8) as u8;
                pixmap.set_pixel(x, y, Color::Rgb(r, g, b));
            }
        }
        pixmap
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        self.samples.count() * (y * self.width + x) as usize
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        if self.data.is_empty() {
            return WHITE;
        }

        let addr = self.offset(x, y);
        match self.samples {
            Samples::Grey => Color::Gray(self.data[addr]),
            Samples::Rgb => Color::from_rgb(&self.data[addr..addr + 3]),
            Samples::Rgba => Color::from_rgba(&self.data[addr..addr + 4]),
        }
    }
}

impl Framebuffer for Pixmap {
    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height || self.data.is_empty() {
            return;
        }

        let addr = self.offset(x, y);
        match self.samples {
            Samples::Grey => {
                self.data[addr] = color.gray();
            }
            Samples::Rgb => {
                self.data[addr..addr + 3].copy_from_slice(&color.rgb());
            }
            Samples::Rgba => {
                self.data[addr..addr + 4].copy_from_slice(&color.rgba());
            }
        }
    }

    fn set_blended_pixel(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        if alpha >= 1.0 {
            self.set_pixel(x, y, color);
            return;
        }
        if x >= self.width || y >= self.height || self.data.is_empty() {
            return;
        }

        let addr = self.offset(x, y);
        match self.samples {
            Samples::Grey => {
                self.data[addr] = lerp(self.data[addr] as f32, color.gray() as f32, alpha) as u8;
            }
            _ => {
                let rgb = color.rgb();
                for (i, c) in self.data[addr..addr + 3].iter_mut().enumerate() {
                    *c = lerp(*c as f32, rgb[i] as f32, alpha) as u8;
                }
            }
        }
    }

    fn invert_region(&mut self, rect: &Rectangle) {
        if self.data.is_empty() {
            return;
        }
        let x_max = rect.max.x.min(self.width as i32);
        let y_max = rect.max.y.min(self.height as i32);
        for y in rect.min.y.max(0)..y_max {
            for x in rect.min.x.max(0)..x_max {
                let addr = self.offset(x as u32, y as u32);
                let span = match self.samples {
                    Samples::Grey => 1,
                    _ => 3,
                };
                for c in self.data[addr..addr + span].iter_mut() {
                    *c = 255 - *c;
                }
            }
        }
    }

    fn update(&mut self, _rect: &Rectangle, _mode: UpdateMode) -> Result<u32, Error> {
        Ok(1)
    }

    fn wait(&self, _token: u32) -> Result<i32, Error> {
        Ok(1)
    }

    fn save(&self, path: &str) -> Result<(), Error> {
        if self.data.is_empty() {
            return Err(format_err!("nothing to save"));
        }
        let file = File::create(path).with_context(|| format!("can't create output file {}", path))?;
        let mut encoder = png::Encoder::new(file, self.width, self.height);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_color(self.samples.color_type());
        let mut writer = encoder
            .write_header()
            .with_context(|| format!("can't write PNG header for {}", path))?;
        writer
            .write_image_data(&self.data)
            .with_context(|| format!("can't write PNG data to {}", path))?;
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BLACK;
    use tempfile::TempDir;

    #[test]
    fn pixels_survive_a_png_round_trip() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("out.png");

        let mut pixmap = Pixmap::new(4, 3, Samples::Rgb);
        pixmap.set_pixel(0, 0, Color::Rgb(10, 20, 30));
        pixmap.set_pixel(3, 2, BLACK);
        pixmap.save(path.to_str().context("non-utf8 temp path")?)?;

        let loaded = Pixmap::from_png(&path)?;
        assert_eq!(loaded.width, 4);
        assert_eq!(loaded.height, 3);
        assert_eq!(loaded.get_pixel(0, 0), Color::Rgb(10, 20, 30));
        assert_eq!(loaded.get_pixel(3, 2), Color::Rgb(0, 0, 0));
        assert_eq!(loaded.get_pixel(1, 1), Color::Rgb(255, 255, 255));

        Ok(())
    }

    #[test]
    fn rgb565_expansion_widens_each_channel() {
        // White (0xFFFF) and a pure green (0x07E0), little-endian.
        let frame = [0xFF, 0xFF, 0xE0, 0x07];
        let pixmap = Pixmap::from_rgb565(&frame, 2, 1, 4);
        assert_eq!(pixmap.get_pixel(0, 0), Color::Rgb(248, 252, 248));
        assert_eq!(pixmap.get_pixel(1, 0), Color::Rgb(0, 252, 0));
    }

    #[test]
    fn rgb565_respects_row_pitch() {
        // One pixel per row, rows padded to 4 bytes.
        let frame = [0x1F, 0x00, 0, 0, 0x00, 0xF8, 0, 0];
        let pixmap = Pixmap::from_rgb565(&frame, 1, 2, 4);
        assert_eq!(pixmap.get_pixel(0, 0), Color::Rgb(0, 0, 248));
        assert_eq!(pixmap.get_pixel(0, 1), Color::Rgb(248, 0, 0));
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut pixmap = Pixmap::new(2, 2, Samples::Grey);
        pixmap.set_pixel(5, 5, BLACK);
        assert_eq!(pixmap.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn invert_flips_and_restores() {
        let mut pixmap = Pixmap::new(2, 2, Samples::Grey);
        let region = rect![0, 0, 1, 1];
        pixmap.invert_region(&region);
        assert_eq!(pixmap.get_pixel(0, 0), BLACK);
        assert_eq!(pixmap.get_pixel(1, 1), WHITE);
        pixmap.invert_region(&region);
        assert_eq!(pixmap.get_pixel(0, 0), WHITE);
    }
}
