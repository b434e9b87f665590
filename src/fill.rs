//! Approximate tracking of how much of the canvas has been painted.

/// Units added per drawn segment, regardless of segment length or stroke
/// speed. Deliberately a coarse approximation instead of true pixel
/// coverage — the tempo curve is tuned around this constant.
pub const STROKE_FILL_UNITS: u32 = 5;

pub struct FillEstimator {
    filled: u32,
    capacity: u32,
}

impl FillEstimator {
    /// `capacity` is the drawable area in pixels.
    pub fn new(capacity: u32) -> Self {
        Self { filled: 0, capacity }
    }

    pub fn on_stroke(&mut self) {
        self.filled = (self.filled + STROKE_FILL_UNITS).min(self.capacity);
    }

    pub fn on_clear(&mut self) {
        self.filled = 0;
    }

    /// Filled fraction in [0, 1].
    pub fn percentage(&self) -> f32 {
        if self.capacity == 0 {
            0.0
        } else {
            self.filled as f32 / self.capacity as f32
        }
    }
}
