//! Canvas — the bitmap the toy paints on.

use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::Path;

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 600;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A fixed-size RGBA drawing surface. Pixels persist until `clear`.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            image: ImageBuffer::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, WHITE),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            self.image.put_pixel(x, y, color);
        }
    }

    fn set_pixel_safe(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as u32, y as u32, color);
        }
    }

    pub fn fill_rect(&mut self, x0: u32, y0: u32, w: u32, h: u32, color: Rgba<u8>) {
        for y in y0..(y0 + h).min(self.height()) {
            for x in x0..(x0 + w).min(self.width()) {
                self.image.put_pixel(x, y, color);
            }
        }
    }

    /// Reset every pixel to white.
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = WHITE;
        }
    }

    /// Draw a straight segment by stepping a filled disc along a
    /// Bresenham line.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba<u8>, thickness: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.draw_disc(x, y, thickness as i32 / 2, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                if x == x1 {
                    break;
                }
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                if y == y1 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_disc(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba<u8>) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel_safe(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Serialize the current pixel state as a PNG.
    pub fn export_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.image.save(path)
    }

    pub fn to_texture_data(&self) -> egui::ColorImage {
        let size = [self.width() as usize, self.height() as usize];
        let pixels: Vec<egui::Color32> = self
            .image
            .pixels()
            .map(|p| egui::Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]))
            .collect();
        egui::ColorImage { size, pixels }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}
