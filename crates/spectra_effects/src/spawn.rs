//! # Spawn Controller
//!
//! Decides, band by band, whether a new particle is emitted this frame.
//!
//! Each slot is a two-state machine:
//!
//! ```text
//!   Idle ──(cooldown reaches 0 and intensity > threshold)──► Armed
//!   Armed ──(probability draw succeeds, pool has room)──► spawn, reset cooldown ──► Idle
//! ```
//!
//! Spawns are served in band order and capped globally per frame. A full
//! pool drops the request: no queueing, no error, the slot stays armed.

use spectra_core::{unit_clamp, ParticlePool, SimRng, Vec2};

use crate::appearance::Appearance;
use crate::frame::FrameMetrics;
use crate::particle::Particle;
use crate::policy::{EffectPhysicsPolicy, SpawnOrigin};
use crate::quality::QualityConfig;
use crate::slots::{SpawnSlot, SpawnSlotTable};

/// Cooldown jitter, as a fraction of the base interval.
const COOLDOWN_JITTER: f32 = 0.5;

/// Where a slot is in its spawn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Cooling down, or too quiet to spawn.
    Idle,
    /// Eligible for a probability draw this frame.
    Armed,
}

/// Result of one spawn pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    /// Particles inserted.
    pub spawned: u32,
    /// Successful draws dropped because the pool was full.
    pub dropped: u32,
}

/// Spawn gating for one engine, derived from its policy and quality preset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnController {
    threshold: f32,
    spawn_rate: f32,
    max_spawn_per_frame: u32,
    detail_scale: f32,
}

impl SpawnController {
    /// Builds the controller for a policy and quality preset.
    #[must_use]
    pub fn new(policy: &EffectPhysicsPolicy, quality: &QualityConfig) -> Self {
        Self {
            threshold: unit_clamp(policy.threshold(quality.overlay_mode)),
            spawn_rate: quality.spawn_rate.max(0.0),
            max_spawn_per_frame: quality.max_spawn_per_frame,
            detail_scale: quality.detail_scale,
        }
    }

    /// Threshold in effect.
    #[inline]
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Current state of a slot.
    #[inline]
    #[must_use]
    pub fn state(&self, slot: &SpawnSlot) -> SlotState {
        if slot.cooldown <= 0.0 && unit_clamp(slot.smoothed_intensity) > self.threshold {
            SlotState::Armed
        } else {
            SlotState::Idle
        }
    }

    /// Per-frame spawn probability for an armed slot at `intensity`.
    ///
    /// Grows linearly from 0 at the threshold to `spawn_rate` at full
    /// intensity, and never leaves `[0, 1]`.
    #[must_use]
    pub fn probability(&self, intensity: f32) -> f32 {
        let intensity = unit_clamp(intensity);
        if intensity <= self.threshold {
            return 0.0;
        }
        let span = (1.0 - self.threshold).max(f32::EPSILON);
        let excess = ((intensity - self.threshold) / span).clamp(0.0, 1.0);
        (excess * self.spawn_rate).clamp(0.0, 1.0)
    }

    /// Fresh cooldown: the base interval divided by the spawn rate, plus up
    /// to half of that again at random.
    pub fn cooldown(&self, policy: &EffectPhysicsPolicy, rng: &mut SimRng) -> f32 {
        let base = policy.spawn_interval / self.spawn_rate.max(f32::EPSILON);
        base + rng.unit() * COOLDOWN_JITTER * base
    }

    /// Runs one spawn pass over every slot.
    pub fn spawn<A: Appearance>(
        &self,
        slots: &mut SpawnSlotTable,
        pool: &mut ParticlePool<Particle>,
        policy: &EffectPhysicsPolicy,
        frame: &FrameMetrics,
        appearance: &A,
        rng: &mut SimRng,
    ) -> SpawnOutcome {
        let mut outcome = SpawnOutcome::default();
        let band_count = slots.len();

        for (band, index) in (0..=u16::MAX).zip(0..band_count) {
            if outcome.spawned >= self.max_spawn_per_frame {
                break;
            }

            let slot = slots.as_slice()[index];
            if self.state(&slot) == SlotState::Idle {
                continue;
            }
            if !rng.chance(self.probability(slot.smoothed_intensity)) {
                continue;
            }

            let Some(handle) = pool.rent() else {
                outcome.dropped += 1;
                continue;
            };

            let particle = self.launch(
                band,
                band_count,
                slot.smoothed_intensity,
                policy,
                frame,
                appearance,
                rng,
            );
            if let Some(target) = pool.get_mut(handle) {
                *target = particle;
            }

            slots.as_mut_slice()[index].cooldown = self.cooldown(policy, rng);
            outcome.spawned += 1;
        }

        outcome
    }

    /// Builds a particle leaving `band`'s column.
    #[allow(clippy::too_many_arguments)]
    fn launch<A: Appearance>(
        &self,
        band: u16,
        band_count: usize,
        intensity: f32,
        policy: &EffectPhysicsPolicy,
        frame: &FrameMetrics,
        appearance: &A,
        rng: &mut SimRng,
    ) -> Particle {
        let intensity = unit_clamp(intensity);
        let column = frame.width / band_count.max(1) as f32;
        let x = (f32::from(band) + 0.5) * column + rng.signed(0.5 * column * policy.column_jitter);

        let lead = policy.margin * 0.5;
        let y = match policy.origin {
            SpawnOrigin::Top => -rng.range(0.0, lead),
            SpawnOrigin::Bottom => frame.height + rng.range(0.0, lead),
            SpawnOrigin::Center => frame.height * 0.5 + rng.signed(frame.height * 0.1),
            SpawnOrigin::Scatter => rng.range(0.0, frame.height),
        };

        let vx = rng.range(policy.launch_x[0], policy.launch_x[1]);
        let vy = rng.range(policy.launch_y[0], policy.launch_y[1]) * (0.5 + 0.5 * intensity);

        let base_size = rng.range(policy.base_size[0], policy.base_size[1]);
        let life = rng.range(policy.life_range[0], policy.life_range[1]);
        let depth = rng.unit();
        let style = appearance.resolve(usize::from(band), band_count, intensity, rng);

        Particle {
            position: Vec2::new(x, y),
            depth,
            velocity: Vec2::new(vx, vy),
            base_size,
            size: base_size * intensity.max(policy.min_size_factor) * self.detail_scale,
            life,
            life_max: life,
            alpha: 1.0,
            band,
            group_key: style.group_key,
            color: style.color,
        }
    }
}
