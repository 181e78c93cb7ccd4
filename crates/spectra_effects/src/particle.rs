//! The simulated entity.

use spectra_core::Vec2;

use crate::appearance::GroupKey;

/// One particle. Owned by exactly one pool; it has no identity beyond its
/// current slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// Screen position (px).
    pub position: Vec2,
    /// Depth hint: 0 = near, 1 = far.
    pub depth: f32,
    /// Velocity (px/s).
    pub velocity: Vec2,
    /// Size before intensity and detail scaling (px).
    pub base_size: f32,
    /// Current drawn size (px), refreshed every frame.
    pub size: f32,
    /// Remaining life (s). Always within `[0, life_max]`.
    pub life: f32,
    /// Life at spawn (s).
    pub life_max: f32,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Band that spawned this particle.
    pub band: u16,
    /// Batch discriminator.
    pub group_key: GroupKey,
    /// Packed `0xRRGGBBAA`, resolved at spawn.
    pub color: u32,
}

impl Particle {
    /// Remaining fraction of life in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn life_fraction(&self) -> f32 {
        if self.life_max > 0.0 {
            (self.life / self.life_max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
