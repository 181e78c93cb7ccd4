//! # Effect Physics Policy
//!
//! Every effect runs the same engine. What makes rain different from
//! floating dots is a single policy value: gravity, drag, how the frame
//! edge is handled, when a band is loud enough to spawn, and how a new
//! particle is launched.

use serde::{Deserialize, Serialize};

use crate::error::{check, ConfigResult};

/// What happens when a particle reaches the edge of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Bounce off the floor (`y = height`); leave through the other edges.
    FloorBounce {
        /// Fraction of impact speed kept after the bounce.
        rebound: f32,
        /// Rebound speeds below this settle to zero.
        settle_speed: f32,
    },
    /// Leave through any edge.
    Expire,
}

/// Where along a band's column a new particle appears.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnOrigin {
    /// Just above the top edge.
    #[default]
    Top,
    /// Just below the bottom edge.
    Bottom,
    /// Vertical center, with some spread.
    Center,
    /// Anywhere in the column.
    Scatter,
}

/// Tuning for one visual effect.
///
/// Units: pixels and seconds. +y points down, so positive gravity falls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectPhysicsPolicy {
    /// Vertical acceleration (px/s²).
    pub gravity: f32,
    /// Per-frame velocity multiplier, slightly below 1.
    pub drag: f32,
    /// Each velocity component is clamped to `[-max_speed, max_speed]`.
    pub max_speed: f32,
    /// Per-frame probability of a horizontal turbulence kick.
    pub turbulence_chance: f32,
    /// Largest horizontal kick (px/s).
    pub turbulence_impulse: f32,
    /// Tangential acceleration about the frame center (px/s²). 0 disables.
    pub swirl: f32,
    /// Edge handling.
    pub boundary: BoundaryMode,
    /// How far outside the frame a particle may drift before removal (px).
    pub margin: f32,
    /// Smoothed intensity a band must exceed to spawn.
    pub spawn_threshold: f32,
    /// Stricter threshold used in overlay mode.
    pub overlay_threshold: f32,
    /// Base cooldown between spawns of one band at `spawn_rate = 1` (s).
    pub spawn_interval: f32,
    /// Where new particles appear.
    pub origin: SpawnOrigin,
    /// Horizontal spread within the band's column, as a fraction of its width.
    pub column_jitter: f32,
    /// Horizontal launch velocity range (px/s).
    pub launch_x: [f32; 2],
    /// Vertical launch velocity range (px/s), scaled by band intensity.
    pub launch_y: [f32; 2],
    /// Lifetime range (s).
    pub life_range: [f32; 2],
    /// Base size range (px).
    pub base_size: [f32; 2],
    /// Lowest intensity factor applied to size, so quiet bands stay visible.
    pub min_size_factor: f32,
    /// Exponent of the alpha decay curve.
    pub decay_exponent: f32,
}

impl EffectPhysicsPolicy {
    /// Rain: falls from the top, bounces on the floor and settles.
    #[must_use]
    pub const fn falling_drops() -> Self {
        Self {
            gravity: 900.0,
            drag: 0.98,
            max_speed: 1_200.0,
            turbulence_chance: 0.02,
            turbulence_impulse: 30.0,
            swirl: 0.0,
            boundary: BoundaryMode::FloorBounce {
                rebound: 0.45,
                settle_speed: 40.0,
            },
            margin: 40.0,
            spawn_threshold: 0.1,
            overlay_threshold: 0.3,
            spawn_interval: 0.15,
            origin: SpawnOrigin::Top,
            column_jitter: 0.4,
            launch_x: [-20.0, 20.0],
            launch_y: [50.0, 250.0],
            life_range: [1.5, 3.0],
            base_size: [2.0, 5.0],
            min_size_factor: 0.3,
            decay_exponent: 2.0,
        }
    }

    /// Dots that rise from the bottom and drift away.
    #[must_use]
    pub const fn floating_dots() -> Self {
        Self {
            gravity: -60.0,
            drag: 0.96,
            max_speed: 300.0,
            turbulence_chance: 0.1,
            turbulence_impulse: 40.0,
            swirl: 0.0,
            boundary: BoundaryMode::Expire,
            margin: 30.0,
            spawn_threshold: 0.15,
            overlay_threshold: 0.35,
            spawn_interval: 0.25,
            origin: SpawnOrigin::Bottom,
            column_jitter: 0.8,
            launch_x: [-30.0, 30.0],
            launch_y: [-120.0, -40.0],
            life_range: [2.0, 4.0],
            base_size: [1.5, 4.0],
            min_size_factor: 0.4,
            decay_exponent: 2.0,
        }
    }

    /// Glyphs tossed up from the middle of the frame, falling back gently.
    #[must_use]
    pub const fn particle_text() -> Self {
        Self {
            gravity: 120.0,
            drag: 0.92,
            max_speed: 400.0,
            turbulence_chance: 0.05,
            turbulence_impulse: 25.0,
            swirl: 0.0,
            boundary: BoundaryMode::Expire,
            margin: 60.0,
            spawn_threshold: 0.12,
            overlay_threshold: 0.3,
            spawn_interval: 0.2,
            origin: SpawnOrigin::Center,
            column_jitter: 0.5,
            launch_x: [-60.0, 60.0],
            launch_y: [-160.0, -40.0],
            life_range: [1.0, 2.5],
            base_size: [8.0, 16.0],
            min_size_factor: 0.5,
            decay_exponent: 2.0,
        }
    }

    /// Weightless bodies orbiting the frame center.
    #[must_use]
    pub const fn aurora() -> Self {
        Self {
            gravity: 0.0,
            drag: 0.985,
            max_speed: 250.0,
            turbulence_chance: 0.03,
            turbulence_impulse: 20.0,
            swirl: 90.0,
            boundary: BoundaryMode::Expire,
            margin: 80.0,
            spawn_threshold: 0.2,
            overlay_threshold: 0.4,
            spawn_interval: 0.3,
            origin: SpawnOrigin::Scatter,
            column_jitter: 1.0,
            launch_x: [-40.0, 40.0],
            launch_y: [-40.0, 40.0],
            life_range: [3.0, 6.0],
            base_size: [4.0, 10.0],
            min_size_factor: 0.5,
            decay_exponent: 1.6,
        }
    }

    /// Spawn threshold in effect for the given overlay setting.
    #[inline]
    #[must_use]
    pub const fn threshold(&self, overlay_mode: bool) -> f32 {
        if overlay_mode {
            self.overlay_threshold
        } else {
            self.spawn_threshold
        }
    }

    /// Longest lifetime a particle can be given.
    #[inline]
    #[must_use]
    pub fn life_max(&self) -> f32 {
        self.life_range[0].max(self.life_range[1])
    }

    /// Checks every field.
    pub fn validate(&self) -> ConfigResult<()> {
        check(true, "gravity", self.gravity, "finite")?;
        check(self.drag > 0.0 && self.drag <= 1.0, "drag", self.drag, "(0, 1]")?;
        check(self.max_speed > 0.0, "max_speed", self.max_speed, "> 0")?;
        check(
            (0.0..=1.0).contains(&self.turbulence_chance),
            "turbulence_chance",
            self.turbulence_chance,
            "[0, 1]",
        )?;
        check(
            self.turbulence_impulse >= 0.0,
            "turbulence_impulse",
            self.turbulence_impulse,
            ">= 0",
        )?;
        check(true, "swirl", self.swirl, "finite")?;
        if let BoundaryMode::FloorBounce {
            rebound,
            settle_speed,
        } = self.boundary
        {
            check((0.0..=1.0).contains(&rebound), "rebound", rebound, "[0, 1]")?;
            check(settle_speed >= 0.0, "settle_speed", settle_speed, ">= 0")?;
        }
        check(self.margin >= 0.0, "margin", self.margin, ">= 0")?;
        for (field, value) in [
            ("spawn_threshold", self.spawn_threshold),
            ("overlay_threshold", self.overlay_threshold),
        ] {
            check((0.0..1.0).contains(&value), field, value, "[0, 1)")?;
        }
        check(
            self.spawn_interval > 0.0,
            "spawn_interval",
            self.spawn_interval,
            "> 0",
        )?;
        check(
            (0.0..=1.0).contains(&self.column_jitter),
            "column_jitter",
            self.column_jitter,
            "[0, 1]",
        )?;
        for (field, [lo, hi]) in [
            ("launch_x", self.launch_x),
            ("launch_y", self.launch_y),
        ] {
            check(lo <= hi, field, lo, "lower bound <= upper bound")?;
            check(true, field, hi, "finite")?;
        }
        let [life_lo, life_hi] = self.life_range;
        check(life_lo > 0.0, "life_range", life_lo, "> 0")?;
        check(life_hi >= life_lo, "life_range", life_hi, ">= lower bound")?;
        let [size_lo, size_hi] = self.base_size;
        check(size_lo > 0.0, "base_size", size_lo, "> 0")?;
        check(size_hi >= size_lo, "base_size", size_hi, ">= lower bound")?;
        check(
            (0.0..=1.0).contains(&self.min_size_factor),
            "min_size_factor",
            self.min_size_factor,
            "[0, 1]",
        )?;
        check(
            self.decay_exponent > 0.0,
            "decay_exponent",
            self.decay_exponent,
            "> 0",
        )
    }

    /// Parses and validates a policy from TOML text. Missing fields take the
    /// floating-dots defaults.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let policy: Self = toml::from_str(text)
            .map_err(|e| crate::error::ConfigError::Parse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }
}

impl Default for EffectPhysicsPolicy {
    fn default() -> Self {
        Self::floating_dots()
    }
}
