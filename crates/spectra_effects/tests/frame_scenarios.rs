//! # Frame Scenario Integration Tests
//!
//! Drives whole engines frame by frame and checks the observable outcome:
//! population bounds, fading, bouncing, decay to empty, and replay.

use spectra_effects::{
    BoundaryMode, DecayCurve, EffectPhysicsPolicy, EngineConfig, FrameMetrics, LifeOutcome,
    LifecycleManager, Particle, PhysicsIntegrator, QualityConfig, QualityTier, SimRng,
    SimulationEngine, StepOutcome, Style, Vec2,
};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

fn config(band_count: usize, seed: u64) -> EngineConfig {
    EngineConfig {
        band_count,
        seed,
        ..EngineConfig::default()
    }
}

fn engine(tier: QualityTier, band_count: usize, seed: u64) -> SimulationEngine {
    SimulationEngine::new(
        EffectPhysicsPolicy::falling_drops(),
        tier.config(),
        config(band_count, seed),
    )
    .expect("built-in presets are valid")
}

/// Scenario A: one saturated band, tiny pool, five frames.
#[test]
fn test_single_band_small_pool() {
    let policy = EffectPhysicsPolicy {
        spawn_threshold: 0.1,
        ..EffectPhysicsPolicy::falling_drops()
    };
    let quality = QualityConfig {
        capacity: 10,
        spawn_rate: 1.0,
        max_spawn_per_frame: 4,
        cull_level: 0.0,
        detail_scale: 1.0,
        smoothing_factor: 1.0,
        overlay_mode: false,
    };
    let mut engine =
        SimulationEngine::new(policy, quality, config(1, 7)).expect("valid configuration");
    let frame = FrameMetrics::new(WIDTH, HEIGHT, 0.1);

    for _ in 0..5 {
        let _ = engine.advance(&[1.0], frame);
        assert!(engine.live_count() <= 10);
    }

    let count = engine.live_count();
    assert!((1..=5).contains(&count), "live count {count} outside 1..=5");
}

/// Scenario B: a full-life particle aged to half life reads alpha 0.25.
#[test]
fn test_half_life_alpha() {
    let manager = LifecycleManager::new(DecayCurve::new(2.0), 0.0);
    let mut particle = Particle {
        life: 1.0,
        life_max: 1.0,
        alpha: 1.0,
        ..Default::default()
    };

    while particle.life > 0.5 + 1e-4 {
        assert_eq!(manager.age(&mut particle, 0.05), LifeOutcome::Alive);
    }

    assert!((particle.alpha - 0.25).abs() <= 0.011);
}

/// Scenario C: crossing the floor at 100 px/s rebounds at about -50 px/s,
/// and gravity brings it back for smaller bounces until it settles.
#[test]
fn test_floor_bounce_then_settle() {
    let policy = EffectPhysicsPolicy {
        gravity: 200.0,
        drag: 1.0,
        turbulence_chance: 0.0,
        boundary: BoundaryMode::FloorBounce {
            rebound: 0.5,
            settle_speed: 20.0,
        },
        ..EffectPhysicsPolicy::falling_drops()
    };
    let physics = PhysicsIntegrator::new(&policy);
    let region = physics.region(WIDTH, HEIGHT);
    let mut rng = SimRng::new(1);
    // 80 px/s plus one frame of gravity reaches the floor at 100 px/s.
    let mut particle = Particle {
        position: Vec2::new(400.0, HEIGHT - 2.0),
        velocity: Vec2::new(0.0, 80.0),
        life: 1.0,
        life_max: 1.0,
        ..Default::default()
    };

    assert_eq!(
        physics.step(&mut particle, &region, 0.1, &mut rng),
        StepOutcome::Inside
    );
    assert!((particle.velocity.y + 50.0).abs() < 1e-3);
    assert_eq!(particle.position.y, HEIGHT);

    let mut bounces = 1;
    let mut settled_after = None;
    for frame in 0..50 {
        let before = particle.velocity.y;
        assert_eq!(
            physics.step(&mut particle, &region, 0.1, &mut rng),
            StepOutcome::Inside
        );
        if before > 0.0 && particle.velocity.y < 0.0 {
            bounces += 1;
        }
        if particle.position.y == HEIGHT && particle.velocity.y == 0.0 {
            settled_after = Some(frame);
            break;
        }
    }

    assert!(bounces >= 2, "only {bounces} bounce(s) before settling");
    assert!(settled_after.is_some(), "never settled");

    for _ in 0..10 {
        physics.step(&mut particle, &region, 0.1, &mut rng);
        assert_eq!(particle.velocity.y, 0.0);
        assert_eq!(particle.position.y, HEIGHT);
    }
}

#[test]
fn test_silence_decays_to_empty() {
    let mut engine = engine(QualityTier::High, 16, 3);
    let frame = FrameMetrics::new(WIDTH, HEIGHT, 0.1);

    for _ in 0..20 {
        let _ = engine.advance(&[1.0; 16], frame);
    }
    assert!(engine.live_count() > 0);

    // Smoothed intensities fall under the threshold within a few frames,
    // then no particle outlives the longest life the policy hands out.
    let silence_frames = ((engine.policy().life_max() + 2.0) / 0.1) as usize;
    for _ in 0..silence_frames {
        let _ = engine.advance(&[0.0; 16], frame);
    }
    assert_eq!(engine.live_count(), 0);
    assert!(engine.advance(&[], frame).is_empty());
}

#[test]
fn test_zero_area_frame_changes_nothing() {
    let mut engine = engine(QualityTier::Medium, 8, 5);
    let frame = FrameMetrics::new(WIDTH, HEIGHT, 0.016);
    for _ in 0..30 {
        let _ = engine.advance(&[0.8; 8], frame);
    }
    let particles = engine.particles().to_vec();
    let slots = engine.slots().to_vec();

    for degenerate in [
        FrameMetrics::new(0.0, HEIGHT, 0.016),
        FrameMetrics::new(WIDTH, -5.0, 0.016),
        FrameMetrics::new(f32::NAN, HEIGHT, 0.016),
    ] {
        assert!(engine.advance(&[1.0; 8], degenerate).is_empty());
    }

    assert_eq!(engine.particles(), particles.as_slice());
    assert_eq!(engine.slots(), slots.as_slice());
    assert_eq!(engine.totals().skipped_frames, 3);
}

#[test]
fn test_overlay_threshold_suppresses_quiet_bands() {
    let quiet = [0.2; 8];
    let quality = QualityConfig {
        smoothing_factor: 1.0,
        ..QualityTier::High.config()
    };
    let frame = FrameMetrics::new(WIDTH, HEIGHT, 0.05);

    let mut normal = SimulationEngine::new(
        EffectPhysicsPolicy::falling_drops(),
        quality,
        config(8, 11),
    )
    .expect("valid configuration");
    let mut overlay = SimulationEngine::new(
        EffectPhysicsPolicy::falling_drops(),
        quality.with_overlay(true),
        config(8, 11),
    )
    .expect("valid configuration");

    for _ in 0..200 {
        let _ = normal.advance(&quiet, frame);
        let _ = overlay.advance(&quiet, frame);
    }

    assert!(normal.totals().spawned > 0);
    assert_eq!(overlay.totals().spawned, 0);
}

#[test]
fn test_extra_spectrum_bands_ignored() {
    let frame = FrameMetrics::new(WIDTH, HEIGHT, 0.016);
    let mut short = engine(QualityTier::High, 4, 21);
    let mut long = engine(QualityTier::High, 4, 21);

    let spectrum = vec![0.9; 4];
    let mut padded = spectrum.clone();
    padded.extend([1.0; 60]);

    for _ in 0..60 {
        let _ = short.advance(&spectrum, frame);
        let _ = long.advance(&padded, frame);
    }

    assert_eq!(short.particles(), long.particles());
    assert!(long.particles().iter().all(|p| p.band < 4));
}

#[test]
fn test_same_seed_replays_exactly() {
    let frame = FrameMetrics::new(WIDTH, HEIGHT, 0.016);
    let spectrum: Vec<f32> = (0..12).map(|i| i as f32 / 12.0).collect();

    let mut a = engine(QualityTier::Ultra, 12, 99);
    let mut b = engine(QualityTier::Ultra, 12, 99);
    let mut c = engine(QualityTier::Ultra, 12, 100);

    for _ in 0..120 {
        let _ = a.advance(&spectrum, frame);
        let _ = b.advance(&spectrum, frame);
        let _ = c.advance(&spectrum, frame);
    }

    assert_eq!(a.particles(), b.particles());
    assert_eq!(a.totals(), b.totals());
    assert_ne!(a.particles(), c.particles());
}

#[test]
fn test_quality_switch_resets_and_rebounds() {
    let mut engine = engine(QualityTier::Ultra, 8, 13);
    let frame = FrameMetrics::new(WIDTH, HEIGHT, 0.016);
    for _ in 0..60 {
        let _ = engine.advance(&[1.0; 8], frame);
    }
    assert!(engine.live_count() > 0);

    engine.set_tier(QualityTier::Low);
    assert_eq!(engine.live_count(), 0);
    assert!(engine.slots().iter().all(|s| s.cooldown == 0.0));

    for _ in 0..600 {
        let _ = engine.advance(&[1.0; 8], frame);
        assert!(engine.live_count() <= QualityTier::Low.config().capacity);
    }
    assert!(engine.totals().peak_live > 0);
}

#[test]
fn test_custom_appearance_and_visibility() {
    let by_band = |band: usize, _band_count: usize, _intensity: f32, _rng: &mut SimRng| Style {
        group_key: band as u16,
        color: 0xFFFF_FFFF,
    };
    let mut engine = SimulationEngine::with_appearance(
        EffectPhysicsPolicy::floating_dots(),
        QualityTier::High.config(),
        config(4, 17),
        by_band,
    )
    .expect("valid configuration");
    let frame = FrameMetrics::new(WIDTH, HEIGHT, 0.016);
    for _ in 0..60 {
        let _ = engine.advance(&[1.0; 4], frame);
    }

    let left_half = |p: Vec2, _size: f32| p.x < WIDTH / 2.0;
    let view = engine.advance_with(&[1.0; 4], frame, &left_half);

    let instances = view.instance_count();
    for batch in view {
        assert!(batch.key() < 4);
        assert!(batch.instances().iter().all(|i| i.position[0] < WIDTH / 2.0));
    }

    assert_eq!(instances, engine.stats().batched as usize);
    assert!(instances <= engine.live_count());
}
