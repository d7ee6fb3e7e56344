//! Render-target abstraction consumed by the view tree.
//!
//! The real draw-command backend lives in the host application; views only
//! need a small pixel-level contract plus a few derived helpers. The
//! in-memory [`Pixmap`] implementation doubles as the screenshot buffer and
//! as the render target used by tests.

mod image;

pub use self::image::{Pixmap, Samples};

use crate::color::Color;
use crate::geom::Rectangle;
use anyhow::Error;

/// How urgently a region must reach the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Interactive feedback: favor latency.
    Gui,
    /// Incremental content change.
    Partial,
    /// Redraw everything.
    Full,
}

pub trait Framebuffer {
    fn set_pixel(&mut self, x: u32, y: u32, color: Color);
    fn set_blended_pixel(&mut self, x: u32, y: u32, color: Color, alpha: f32);
    fn invert_region(&mut self, rect: &Rectangle);
    fn update(&mut self, rect: &Rectangle, mode: UpdateMode) -> Result<u32, Error>;
    fn wait(&self, token: u32) -> Result<i32, Error>;
    fn save(&self, path: &str) -> Result<(), Error>;
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn dims(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn rect(&self) -> Rectangle {
        rect![0, 0, self.width() as i32, self.height() as i32]
    }

    fn draw_rectangle(&mut self, rect: &Rectangle, color: Color) {
        for y in rect.min.y.max(0)..rect.max.y {
            for x in rect.min.x.max(0)..rect.max.x {
                self.set_pixel(x as u32, y as u32, color);
            }
        }
    }

    fn draw_rectangle_outline(&mut self, rect: &Rectangle, thickness: u16, color: Color) {
        let t = thickness as i32;
        self.draw_rectangle(&rect![rect.min.x, rect.min.y, rect.max.x, rect.min.y + t], color);
        self.draw_rectangle(&rect![rect.min.x, rect.max.y - t, rect.max.x, rect.max.y], color);
        self.draw_rectangle(&rect![rect.min.x, rect.min.y, rect.min.x + t, rect.max.y], color);
        self.draw_rectangle(&rect![rect.max.x - t, rect.min.y, rect.max.x, rect.max.y], color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn outline_leaves_interior_untouched() {
        let mut pixmap = Pixmap::new(8, 8, Samples::Grey);
        pixmap.draw_rectangle_outline(&rect![0, 0, 8, 8], 1, BLACK);
        assert_eq!(pixmap.get_pixel(0, 0), BLACK);
        assert_eq!(pixmap.get_pixel(7, 7), BLACK);
        assert_eq!(pixmap.get_pixel(3, 3), WHITE);
    }

    #[test]
    fn draw_rectangle_clips_negative_coordinates() {
        let mut pixmap = Pixmap::new(4, 4, Samples::Grey);
        pixmap.draw_rectangle(&rect![-2, -2, 2, 2], BLACK);
        assert_eq!(pixmap.get_pixel(1, 1), BLACK);
        assert_eq!(pixmap.get_pixel(2, 2), WHITE);
    }
}
