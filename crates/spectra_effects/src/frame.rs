//! Per-frame input metrics.

use spectra_core::finite_or_zero;

/// Shortest simulated step, in seconds.
pub const MIN_DT: f32 = 0.001;
/// Longest simulated step, in seconds. Stalls are not replayed.
pub const MAX_DT: f32 = 0.1;

/// Frame dimensions and elapsed time handed to [`advance`](crate::SimulationEngine::advance).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetrics {
    /// Drawable width in pixels.
    pub width: f32,
    /// Drawable height in pixels.
    pub height: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
}

impl FrameMetrics {
    /// Creates frame metrics.
    #[must_use]
    pub const fn new(width: f32, height: f32, dt: f32) -> Self {
        Self { width, height, dt }
    }

    /// True when the frame has no drawable area, or its size is not a number.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// Elapsed time clamped to `[MIN_DT, MAX_DT]`. Non-finite input counts as 0.
    #[must_use]
    pub fn clamped_dt(&self) -> f32 {
        finite_or_zero(self.dt).clamp(MIN_DT, MAX_DT)
    }
}
