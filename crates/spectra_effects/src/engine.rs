//! # Simulation Engine
//!
//! One engine per effect. Each call to [`SimulationEngine::advance`] runs
//! the whole frame pipeline to completion:
//!
//! ```text
//! spectrum ──► SpawnSlotTable::update
//!          ──► SpawnController::spawn        (pool.rent)
//!          ──► PhysicsIntegrator::step  ┐
//!          ──► LifecycleManager::age    ┘    one combined pass, swap-remove
//!          ──► BatchGrouper::group
//!          ──► GroupedView<'_>               (borrows the engine)
//! ```
//!
//! The returned view borrows the engine, so the borrow checker rejects any
//! attempt to hold it across the next `advance`.

use spectra_core::{finite_or_zero, ParticlePool, SimRng};

use crate::appearance::{Appearance, BandedPalette};
use crate::batch::{BatchGrouper, FrameBounds, GroupedView, Visibility};
use crate::error::{ConfigError, ConfigResult};
use crate::frame::FrameMetrics;
use crate::lifecycle::{DecayCurve, LifeOutcome, LifecycleManager};
use crate::particle::Particle;
use crate::physics::{PhysicsIntegrator, StepOutcome};
use crate::policy::EffectPhysicsPolicy;
use crate::quality::{QualityConfig, QualityTier};
use crate::slots::{SpawnSlot, SpawnSlotTable};
use crate::spawn::SpawnController;
use crate::stats::{EngineStats, FrameStats};

/// Most spectrum bands one engine tracks. Band indices are stored as `u16`.
pub const MAX_BANDS: usize = u16::MAX as usize;

/// Construction parameters that are neither physics nor quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Spectrum bands, one spawn slot each.
    pub band_count: usize,
    /// Seed for the engine's random stream.
    pub seed: u64,
    /// Most distinct group keys in one view.
    pub max_batches: usize,
    /// Most instances per group key.
    pub max_batch_size: usize,
}

impl EngineConfig {
    /// Checks the band count and the batch limits.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.band_count > MAX_BANDS {
            return Err(ConfigError::TooLarge {
                field: "band_count",
                value: self.band_count,
                max: MAX_BANDS,
            });
        }
        if self.max_batches == 0 {
            return Err(ConfigError::ZeroBatchLimit {
                field: "max_batches",
            });
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroBatchLimit {
                field: "max_batch_size",
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            band_count: 32,
            seed: SimRng::DEFAULT_SEED,
            max_batches: 64,
            max_batch_size: 4096,
        }
    }
}

/// Audio-reactive particle simulation for one effect.
#[derive(Debug)]
pub struct SimulationEngine<A: Appearance = BandedPalette> {
    policy: EffectPhysicsPolicy,
    quality: QualityConfig,
    config: EngineConfig,
    appearance: A,
    pool: ParticlePool<Particle>,
    slots: SpawnSlotTable,
    spawner: SpawnController,
    physics: PhysicsIntegrator,
    lifecycle: LifecycleManager,
    grouper: BatchGrouper,
    rng: SimRng,
    frame_stats: FrameStats,
    totals: EngineStats,
}

impl SimulationEngine<BandedPalette> {
    /// Creates an engine with the default intensity palette.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the policy, the quality preset or the
    /// batch limits are invalid.
    pub fn new(
        policy: EffectPhysicsPolicy,
        quality: QualityConfig,
        config: EngineConfig,
    ) -> ConfigResult<Self> {
        Self::with_appearance(policy, quality, config, BandedPalette::default())
    }
}

impl<A: Appearance> SimulationEngine<A> {
    /// Creates an engine that styles new particles with `appearance`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the policy, the quality preset or the
    /// batch limits are invalid.
    pub fn with_appearance(
        policy: EffectPhysicsPolicy,
        quality: QualityConfig,
        config: EngineConfig,
        appearance: A,
    ) -> ConfigResult<Self> {
        policy.validate()?;
        quality.validate("custom")?;
        config.validate()?;

        tracing::debug!(
            capacity = quality.capacity,
            bands = config.band_count,
            seed = config.seed,
            "simulation engine created"
        );

        Ok(Self {
            policy,
            quality,
            config,
            appearance,
            pool: ParticlePool::new(quality.capacity),
            slots: SpawnSlotTable::new(config.band_count, quality.smoothing_factor),
            spawner: SpawnController::new(&policy, &quality),
            physics: PhysicsIntegrator::new(&policy),
            lifecycle: LifecycleManager::new(
                DecayCurve::new(policy.decay_exponent),
                quality.cull_level,
            ),
            grouper: BatchGrouper::new(config.max_batches, config.max_batch_size),
            rng: SimRng::new(config.seed),
            frame_stats: FrameStats::default(),
            totals: EngineStats::default(),
        })
    }

    /// Runs one frame and returns what to draw, culled against the frame
    /// rectangle.
    pub fn advance(&mut self, spectrum: &[f32], frame: FrameMetrics) -> GroupedView<'_> {
        let bounds = FrameBounds {
            width: frame.width,
            height: frame.height,
        };
        self.advance_with(spectrum, frame, &bounds)
    }

    /// Runs one frame, culling with the drawing layer's own predicate.
    ///
    /// A frame without area changes nothing and yields an empty view.
    pub fn advance_with<V>(
        &mut self,
        spectrum: &[f32],
        frame: FrameMetrics,
        visibility: &V,
    ) -> GroupedView<'_>
    where
        V: Visibility + ?Sized,
    {
        if frame.is_degenerate() {
            self.grouper.clear();
            self.frame_stats = FrameStats {
                live: self.live_count_u32(),
                ..FrameStats::default()
            };
            self.totals.skipped_frames += 1;
            return self.grouper.view();
        }

        let dt = frame.clamped_dt();
        self.slots.update(spectrum, dt);

        let spawn = self.spawner.spawn(
            &mut self.slots,
            &mut self.pool,
            &self.policy,
            &frame,
            &self.appearance,
            &mut self.rng,
        );

        let region = self.physics.region(frame.width, frame.height);
        let size_floor = self.policy.min_size_factor;
        let detail_scale = self.quality.detail_scale;
        let (mut expired, mut culled, mut escaped) = (0_u32, 0_u32, 0_u32);

        let physics = &self.physics;
        let lifecycle = &self.lifecycle;
        let slots = &self.slots;
        let rng = &mut self.rng;

        self.pool.retain_mut(|particle| {
            if physics.step(particle, &region, dt, rng) == StepOutcome::Escaped {
                escaped += 1;
                return false;
            }

            let intensity = slots.intensity(usize::from(particle.band));
            particle.size =
                finite_or_zero(particle.base_size * intensity.max(size_floor) * detail_scale);

            match lifecycle.age(particle, dt) {
                LifeOutcome::Alive => true,
                LifeOutcome::Expired => {
                    expired += 1;
                    false
                }
                LifeOutcome::Culled => {
                    culled += 1;
                    false
                }
            }
        });

        let grouping = self.grouper.group(self.pool.as_slice(), visibility);

        self.frame_stats = FrameStats {
            live: self.live_count_u32(),
            spawned: spawn.spawned,
            dropped: spawn.dropped,
            expired,
            culled,
            escaped,
            batched: grouping.batched,
            omitted: grouping.omitted,
        };
        self.totals.accumulate(&self.frame_stats);

        tracing::trace!(
            live = self.frame_stats.live,
            spawned = self.frame_stats.spawned,
            dropped = self.frame_stats.dropped,
            removed = self.frame_stats.removed(),
            omitted = self.frame_stats.omitted,
            "frame advanced"
        );

        self.grouper.view()
    }

    /// Applies a quality preset. The pool and every slot are reset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the preset is invalid; the engine is left
    /// unchanged.
    pub fn set_quality(&mut self, quality: QualityConfig) -> ConfigResult<()> {
        quality.validate("custom")?;
        self.apply_quality(quality);
        Ok(())
    }

    /// Applies a built-in tier, keeping the current overlay setting.
    pub fn set_tier(&mut self, tier: QualityTier) {
        let quality = tier.config().with_overlay(self.quality.overlay_mode);
        tracing::debug!(tier = tier.name(), "quality tier selected");
        self.apply_quality(quality);
    }

    /// Switches overlay mode on or off. Live particles are kept.
    pub fn set_overlay(&mut self, overlay_mode: bool) {
        self.quality.overlay_mode = overlay_mode;
        self.spawner = SpawnController::new(&self.policy, &self.quality);
    }

    /// Changes the number of spectrum bands. Every slot is reset; live
    /// particles are kept. Counts above [`MAX_BANDS`] are clamped.
    pub fn set_band_count(&mut self, band_count: usize) {
        if band_count > MAX_BANDS {
            tracing::warn!(requested = band_count, max = MAX_BANDS, "band count clamped");
        }
        let band_count = band_count.min(MAX_BANDS);
        if band_count == self.slots.len() {
            return;
        }
        tracing::debug!(
            from = self.slots.len(),
            to = band_count,
            "band count changed"
        );
        self.config.band_count = band_count;
        self.slots.reset(band_count, self.quality.smoothing_factor);
    }

    /// Changes the batch limits. Takes effect on the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBatchLimit`] if either limit is zero; the
    /// engine is left unchanged.
    pub fn set_batch_limits(
        &mut self,
        max_batches: usize,
        max_batch_size: usize,
    ) -> ConfigResult<()> {
        let config = EngineConfig {
            max_batches,
            max_batch_size,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        self.grouper.set_limits(max_batches, max_batch_size);
        Ok(())
    }

    /// Restarts the random stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        tracing::debug!(seed, "engine reseeded");
        self.config.seed = seed;
        self.rng.reseed(seed);
    }

    /// Removes every particle and resets every slot. Totals are kept.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.slots
            .reset(self.config.band_count, self.quality.smoothing_factor);
        self.grouper.clear();
        self.frame_stats = FrameStats::default();
    }

    /// Live particles.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.pool.len()
    }

    /// Live particles, in pool order.
    #[inline]
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        self.pool.as_slice()
    }

    /// Spawn slots, in band order.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[SpawnSlot] {
        self.slots.as_slice()
    }

    /// Counters from the most recent frame.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &FrameStats {
        &self.frame_stats
    }

    /// Counters since creation.
    #[inline]
    #[must_use]
    pub const fn totals(&self) -> &EngineStats {
        &self.totals
    }

    /// Quality preset in effect.
    #[inline]
    #[must_use]
    pub const fn quality(&self) -> &QualityConfig {
        &self.quality
    }

    /// Physics policy in effect.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> &EffectPhysicsPolicy {
        &self.policy
    }

    /// Construction parameters in effect.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pool capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    fn apply_quality(&mut self, quality: QualityConfig) {
        tracing::debug!(
            capacity = quality.capacity,
            spawn_rate = quality.spawn_rate,
            overlay = quality.overlay_mode,
            "quality preset applied"
        );
        self.quality = quality;
        self.pool.reset(quality.capacity);
        self.slots
            .reset(self.config.band_count, quality.smoothing_factor);
        self.spawner = SpawnController::new(&self.policy, &quality);
        self.lifecycle = LifecycleManager::new(
            DecayCurve::new(self.policy.decay_exponent),
            quality.cull_level,
        );
        self.grouper.clear();
        self.frame_stats = FrameStats::default();
    }

    fn live_count_u32(&self) -> u32 {
        u32::try_from(self.pool.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(tier: QualityTier) -> SimulationEngine {
        SimulationEngine::new(
            EffectPhysicsPolicy::falling_drops(),
            tier.config(),
            EngineConfig {
                band_count: 8,
                seed: 42,
                ..EngineConfig::default()
            },
        )
        .expect("valid configuration")
    }

    #[test]
    fn test_rejects_invalid_config() {
        let zero_batches = EngineConfig {
            max_batches: 0,
            ..EngineConfig::default()
        };
        let result = SimulationEngine::new(
            EffectPhysicsPolicy::default(),
            QualityConfig::default(),
            zero_batches,
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::ZeroBatchLimit {
                field: "max_batches"
            })
        );

        let zero_capacity = QualityConfig {
            capacity: 0,
            ..QualityConfig::default()
        };
        assert!(SimulationEngine::new(
            EffectPhysicsPolicy::default(),
            zero_capacity,
            EngineConfig::default()
        )
        .is_err());
    }

    #[test]
    fn test_rejects_oversized_config() {
        let huge_pool = QualityConfig {
            capacity: usize::MAX / 2,
            ..QualityTier::High.config()
        };
        assert!(matches!(
            SimulationEngine::new(
                EffectPhysicsPolicy::falling_drops(),
                huge_pool,
                EngineConfig::default()
            ),
            Err(ConfigError::TooLarge {
                field: "capacity",
                ..
            })
        ));

        let too_many_bands = EngineConfig {
            band_count: MAX_BANDS + 1,
            ..EngineConfig::default()
        };
        assert_eq!(
            too_many_bands.validate(),
            Err(ConfigError::TooLarge {
                field: "band_count",
                value: MAX_BANDS + 1,
                max: MAX_BANDS,
            })
        );

        let mut engine = engine(QualityTier::Low);
        assert!(engine.set_quality(huge_pool).is_err());
        assert_eq!(engine.capacity(), QualityTier::Low.config().capacity);
    }

    #[test]
    fn test_set_band_count_clamps() {
        let mut engine = engine(QualityTier::Low);
        engine.set_band_count(usize::MAX);
        assert_eq!(engine.slots().len(), MAX_BANDS);
        assert_eq!(engine.config().band_count, MAX_BANDS);

        // The last band still gets its own index
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);
        let mut spectrum = vec![0.0; MAX_BANDS];
        spectrum[MAX_BANDS - 1] = 1.0;
        for _ in 0..30 {
            let _ = engine.advance(&spectrum, frame);
        }
        assert!(engine.live_count() > 0);
        assert!(engine
            .particles()
            .iter()
            .all(|p| usize::from(p.band) == MAX_BANDS - 1));
    }

    #[test]
    fn test_set_batch_limits() {
        let mut engine = engine(QualityTier::High);
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);
        for _ in 0..30 {
            let _ = engine.advance(&[1.0; 8], frame);
        }
        assert!(engine.advance(&[1.0; 8], frame).instance_count() > 1);

        assert_eq!(
            engine.set_batch_limits(0, 16),
            Err(ConfigError::ZeroBatchLimit {
                field: "max_batches"
            })
        );
        assert_eq!(engine.config().max_batches, EngineConfig::default().max_batches);

        engine
            .set_batch_limits(1, 1)
            .expect("non-zero limits are valid");
        assert_eq!(engine.config().max_batches, 1);

        let view = engine.advance(&[1.0; 8], frame);
        assert_eq!(view.len(), 1);
        assert_eq!(view.instance_count(), 1);
        let stats = *engine.stats();
        assert_eq!(stats.batched, 1);
        assert!(stats.omitted >= 1);
    }

    #[test]
    fn test_loud_spectrum_spawns() {
        let mut engine = engine(QualityTier::High);
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);

        for _ in 0..30 {
            let _ = engine.advance(&[1.0; 8], frame);
        }

        assert!(engine.live_count() > 0);
        assert!(engine.totals().spawned > 0);
        assert_eq!(engine.totals().frames, 30);
    }

    #[test]
    fn test_silence_spawns_nothing() {
        let mut engine = engine(QualityTier::High);
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);

        for _ in 0..30 {
            let view = engine.advance(&[], frame);
            assert!(view.is_empty());
        }
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn test_degenerate_frame_is_noop() {
        let mut engine = engine(QualityTier::High);
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);
        for _ in 0..10 {
            let _ = engine.advance(&[1.0; 8], frame);
        }
        let before: Vec<Particle> = engine.particles().to_vec();

        let view = engine.advance(&[1.0; 8], FrameMetrics::new(0.0, 600.0, 0.016));
        assert!(view.is_empty());
        assert_eq!(engine.particles(), before.as_slice());
        assert_eq!(engine.totals().skipped_frames, 1);
        assert_eq!(engine.totals().frames, 10);
    }

    #[test]
    fn test_view_matches_population() {
        let mut engine = engine(QualityTier::Ultra);
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);
        for _ in 0..20 {
            let _ = engine.advance(&[0.9; 8], frame);
        }

        let instances = engine.advance(&[0.9; 8], frame).instance_count();
        let stats = *engine.stats();
        assert_eq!(instances, stats.batched as usize);
        assert!(stats.batched + stats.omitted <= stats.live);
    }

    #[test]
    fn test_set_quality_resets_state() {
        let mut engine = engine(QualityTier::High);
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);
        for _ in 0..20 {
            let _ = engine.advance(&[1.0; 8], frame);
        }
        assert!(engine.live_count() > 0);

        engine.set_tier(QualityTier::Low);
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.capacity(), QualityTier::Low.config().capacity);
        assert!(engine.slots().iter().all(|s| *s == SpawnSlot::default()));

        let bad = QualityConfig {
            smoothing_factor: 0.0,
            ..QualityConfig::default()
        };
        assert!(engine.set_quality(bad).is_err());
        assert_eq!(engine.quality().capacity, QualityTier::Low.config().capacity);
    }

    #[test]
    fn test_set_band_count_keeps_particles() {
        let mut engine = engine(QualityTier::High);
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);
        for _ in 0..20 {
            let _ = engine.advance(&[1.0; 8], frame);
        }
        let live = engine.live_count();

        engine.set_band_count(16);
        assert_eq!(engine.slots().len(), 16);
        assert_eq!(engine.live_count(), live);
    }

    #[test]
    fn test_clear_empties_pool() {
        let mut engine = engine(QualityTier::High);
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);
        for _ in 0..20 {
            let _ = engine.advance(&[1.0; 8], frame);
        }

        engine.clear();
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.stats().live, 0);
    }

    #[test]
    fn test_reseed_replays() {
        let frame = FrameMetrics::new(800.0, 600.0, 0.016);
        let mut a = engine(QualityTier::High);
        let mut b = engine(QualityTier::High);
        b.reseed(42);

        for _ in 0..40 {
            let _ = a.advance(&[0.7; 8], frame);
            let _ = b.advance(&[0.7; 8], frame);
        }
        assert_eq!(a.particles(), b.particles());
    }
}
