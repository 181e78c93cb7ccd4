//! Per-band spawn state.

use spectra_core::{finite_or_zero, lerp, unit_clamp};

/// State of one spectrum band.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnSlot {
    /// Exponential moving average of the band magnitude, in `[0, 1]`.
    pub smoothed_intensity: f32,
    /// Seconds before this band may spawn again.
    pub cooldown: f32,
}

/// One [`SpawnSlot`] per band.
#[derive(Clone, Debug, Default)]
pub struct SpawnSlotTable {
    slots: Vec<SpawnSlot>,
    smoothing_factor: f32,
}

impl SpawnSlotTable {
    /// Creates `band_count` idle slots.
    #[must_use]
    pub fn new(band_count: usize, smoothing_factor: f32) -> Self {
        Self {
            slots: vec![SpawnSlot::default(); band_count],
            smoothing_factor: unit_clamp(smoothing_factor),
        }
    }

    /// Resizes the table. Every slot is reset, including ones that survive.
    pub fn reset(&mut self, band_count: usize, smoothing_factor: f32) {
        self.slots.clear();
        self.slots.resize(band_count, SpawnSlot::default());
        self.smoothing_factor = unit_clamp(smoothing_factor);
    }

    /// Blends the new magnitudes into the moving averages and counts down
    /// cooldowns.
    ///
    /// Bands without an input value blend toward zero. Inputs are clamped
    /// to `[0, 1]`, non-finite values count as zero.
    pub fn update(&mut self, band_intensities: &[f32], dt: f32) {
        let dt = finite_or_zero(dt);
        let k = self.smoothing_factor;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let raw = band_intensities.get(i).copied().map_or(0.0, unit_clamp);
            slot.smoothed_intensity = unit_clamp(lerp(slot.smoothed_intensity, raw, k));
            slot.cooldown = (slot.cooldown - dt).max(0.0);
        }
    }

    /// Number of bands.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when there are no bands.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Smoothing weight in use.
    #[inline]
    #[must_use]
    pub const fn smoothing_factor(&self) -> f32 {
        self.smoothing_factor
    }

    /// Smoothed intensity of `band`, or 0 for an unknown band.
    #[inline]
    #[must_use]
    pub fn intensity(&self, band: usize) -> f32 {
        self.slots.get(band).map_or(0.0, |s| s.smoothed_intensity)
    }

    /// All slots, in band order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[SpawnSlot] {
        &self.slots
    }

    /// All slots, mutable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [SpawnSlot] {
        &mut self.slots
    }
}
