//! Color palette — ten fixed swatches stacked down the canvas left edge.
//!
//! The swatches are part of the canvas bitmap itself, so clearing the
//! canvas repaints them. A pointer press is resolved to a color purely
//! from its coordinates.

use crate::canvas::Canvas;
use image::Rgba;

/// Width of the swatch column in canvas pixels.
pub const PALETTE_WIDTH: u32 = 50;
/// Height of each swatch band. Bands stack from y=0.
pub const SWATCH_HEIGHT: u32 = 50;

pub struct PaletteEntry {
    pub index: usize,
    pub name: &'static str,
    pub color: Rgba<u8>,
}

pub static PALETTE: [PaletteEntry; 10] = [
    PaletteEntry { index: 0, name: "red", color: Rgba([255, 0, 0, 255]) },
    PaletteEntry { index: 1, name: "orange", color: Rgba([255, 165, 0, 255]) },
    PaletteEntry { index: 2, name: "yellow", color: Rgba([255, 255, 0, 255]) },
    PaletteEntry { index: 3, name: "green", color: Rgba([0, 128, 0, 255]) },
    PaletteEntry { index: 4, name: "cyan", color: Rgba([0, 255, 255, 255]) },
    PaletteEntry { index: 5, name: "blue", color: Rgba([0, 0, 255, 255]) },
    PaletteEntry { index: 6, name: "magenta", color: Rgba([255, 0, 255, 255]) },
    PaletteEntry { index: 7, name: "brown", color: Rgba([165, 42, 42, 255]) },
    PaletteEntry { index: 8, name: "white", color: Rgba([255, 255, 255, 255]) },
    PaletteEntry { index: 9, name: "black", color: Rgba([0, 0, 0, 255]) },
];

/// Resolve a canvas coordinate to the swatch under it.
///
/// Returns `None` right of the swatch column or below the last band.
pub fn color_at(x: i32, y: i32) -> Option<&'static PaletteEntry> {
    if x < 0 || x >= PALETTE_WIDTH as i32 || y < 0 {
        return None;
    }
    PALETTE.get((y as u32 / SWATCH_HEIGHT) as usize)
}

/// Paint the swatch column into the canvas bitmap.
pub fn paint_swatches(canvas: &mut Canvas) {
    for entry in &PALETTE {
        let y0 = entry.index as u32 * SWATCH_HEIGHT;
        canvas.fill_rect(0, y0, PALETTE_WIDTH, SWATCH_HEIGHT, entry.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_resolution() {
        // Each band [i*50, (i+1)*50) maps to exactly one entry
        for (i, entry) in PALETTE.iter().enumerate() {
            let top = (i as u32 * SWATCH_HEIGHT) as i32;
            assert_eq!(color_at(0, top).unwrap().index, entry.index);
            assert_eq!(color_at(25, top + 25).unwrap().index, entry.index);
            assert_eq!(
                color_at(49, top + SWATCH_HEIGHT as i32 - 1).unwrap().index,
                entry.index
            );
        }
    }

    #[test]
    fn test_outside_column() {
        assert!(color_at(50, 25).is_none());
        assert!(color_at(400, 25).is_none());
        assert!(color_at(-1, 25).is_none());
    }

    #[test]
    fn test_below_last_band() {
        let bottom = (PALETTE.len() as u32 * SWATCH_HEIGHT) as i32;
        assert!(color_at(25, bottom).is_none());
        assert!(color_at(25, 599).is_none());
        assert!(color_at(25, -1).is_none());
    }

    #[test]
    fn test_band_boundary_belongs_to_lower_band() {
        // y = 50 is the first row of the second swatch, not the first
        assert_eq!(color_at(0, 50).unwrap().name, "orange");
        assert_eq!(color_at(0, 49).unwrap().name, "red");
    }
}
