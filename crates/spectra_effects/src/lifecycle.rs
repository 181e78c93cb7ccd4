//! # Lifecycle
//!
//! Ages particles, maps remaining life to alpha and decides removals.
//!
//! Alpha follows `t^k` where `t` is the remaining life fraction. The curve
//! is precomputed once into a 101-entry table indexed by `round(t * 100)`,
//! so the per-particle cost is a clamp and a load.

use spectra_core::unit_clamp;

use crate::particle::Particle;

/// Entries in the decay table (`t = 0.00 ..= 1.00`).
pub const DECAY_TABLE_SIZE: usize = 101;

/// Monotonic map from remaining-life fraction to alpha.
#[derive(Clone, Debug, PartialEq)]
pub struct DecayCurve {
    table: [f32; DECAY_TABLE_SIZE],
    exponent: f32,
}

impl DecayCurve {
    /// Precomputes `t^exponent`. A non-positive or non-finite exponent
    /// falls back to linear.
    #[must_use]
    pub fn new(exponent: f32) -> Self {
        let exponent = if exponent.is_finite() && exponent > 0.0 {
            exponent
        } else {
            1.0
        };

        let mut table = [0.0; DECAY_TABLE_SIZE];
        let last = (DECAY_TABLE_SIZE - 1) as f32;
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = (i as f32 / last).powf(exponent).clamp(0.0, 1.0);
        }

        Self { table, exponent }
    }

    /// Exponent the table was built with.
    #[inline]
    #[must_use]
    pub const fn exponent(&self) -> f32 {
        self.exponent
    }

    /// Alpha for remaining-life fraction `t`. `t` is clamped to `[0, 1]`
    /// first; non-finite input reads as 0.
    #[inline]
    #[must_use]
    pub fn sample(&self, t: f32) -> f32 {
        let last = DECAY_TABLE_SIZE - 1;
        let index = (unit_clamp(t) * last as f32).round() as usize;
        self.table[index.min(last)]
    }
}

impl Default for DecayCurve {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// What aging did to a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeOutcome {
    /// Still alive.
    Alive,
    /// Life ran out.
    Expired,
    /// Faded below the quality tier's cull level.
    Culled,
}

/// Aging rules for one engine.
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleManager {
    curve: DecayCurve,
    cull_level: f32,
}

impl LifecycleManager {
    /// Creates the manager. A `cull_level` of 0 disables early culling.
    #[must_use]
    pub fn new(curve: DecayCurve, cull_level: f32) -> Self {
        Self {
            curve,
            cull_level: unit_clamp(cull_level),
        }
    }

    /// The decay curve.
    #[inline]
    #[must_use]
    pub const fn curve(&self) -> &DecayCurve {
        &self.curve
    }

    /// Alpha floor in effect.
    #[inline]
    #[must_use]
    pub const fn cull_level(&self) -> f32 {
        self.cull_level
    }

    /// Subtracts `dt` from the particle's life and refreshes its alpha.
    pub fn age(&self, particle: &mut Particle, dt: f32) -> LifeOutcome {
        particle.life -= dt;

        // NaN life counts as dead
        if !(particle.life > 0.0) {
            particle.life = 0.0;
            particle.alpha = 0.0;
            return LifeOutcome::Expired;
        }

        particle.life = particle.life.min(particle.life_max);
        particle.alpha = self.curve.sample(particle.life_fraction());

        if particle.alpha < self.cull_level {
            LifeOutcome::Culled
        } else {
            LifeOutcome::Alive
        }
    }
}
