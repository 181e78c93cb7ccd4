//! # Quality Presets
//!
//! A quality tier caps what a frame may cost: pool capacity, spawn pressure
//! and how eagerly faded particles are culled.
//!
//! The built-in presets are `const` values. A studio can ship its own table
//! as TOML and load it once at startup:
//!
//! ```toml
//! [low]
//! capacity = 200
//! spawn_rate = 0.4
//! max_spawn_per_frame = 2
//! cull_level = 0.2
//! detail_scale = 0.5
//! smoothing_factor = 0.2
//! overlay_mode = false
//! ```
//!
//! Tiers missing from the file keep their built-in preset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{check, ConfigError, ConfigResult};

/// Largest pool any preset may ask for.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Cost limits for one simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Maximum live particles.
    pub capacity: usize,
    /// Multiplier on spawn probability, and divisor of the slot cooldown.
    pub spawn_rate: f32,
    /// Global cap on insertions per frame, served in band order.
    pub max_spawn_per_frame: u32,
    /// Alpha floor below which a particle is culled early. 0 disables culling.
    pub cull_level: f32,
    /// Scale applied to every particle size.
    pub detail_scale: f32,
    /// Weight of the newest band magnitude in the moving average.
    pub smoothing_factor: f32,
    /// Use the policy's stricter overlay spawn threshold.
    pub overlay_mode: bool,
}

impl QualityConfig {
    /// Checks every field, naming the preset in the error.
    pub fn validate(&self, tier: &str) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                tier: tier.to_owned(),
            });
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::TooLarge {
                field: "capacity",
                value: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        check(self.spawn_rate > 0.0, "spawn_rate", self.spawn_rate, "> 0")?;
        check(
            (0.0..1.0).contains(&self.cull_level),
            "cull_level",
            self.cull_level,
            "[0, 1)",
        )?;
        check(
            self.detail_scale > 0.0,
            "detail_scale",
            self.detail_scale,
            "> 0",
        )?;
        check(
            self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0,
            "smoothing_factor",
            self.smoothing_factor,
            "(0, 1]",
        )
    }

    /// Same preset with overlay mode switched on or off.
    #[must_use]
    pub fn with_overlay(mut self, overlay_mode: bool) -> Self {
        self.overlay_mode = overlay_mode;
        self
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityTier::default().config()
    }
}

/// Named quality tiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Integrated graphics, battery saver.
    Low,
    /// The default.
    #[default]
    Medium,
    /// Discrete GPU.
    High,
    /// Capture and showcase.
    Ultra,
}

impl QualityTier {
    /// Every tier, cheapest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Ultra];

    /// The built-in preset for this tier.
    #[must_use]
    pub const fn config(self) -> QualityConfig {
        match self {
            Self::Low => QualityConfig {
                capacity: 300,
                spawn_rate: 0.5,
                max_spawn_per_frame: 2,
                cull_level: 0.15,
                detail_scale: 0.6,
                smoothing_factor: 0.2,
                overlay_mode: false,
            },
            Self::Medium => QualityConfig {
                capacity: 1_000,
                spawn_rate: 0.75,
                max_spawn_per_frame: 4,
                cull_level: 0.08,
                detail_scale: 0.8,
                smoothing_factor: 0.3,
                overlay_mode: false,
            },
            Self::High => QualityConfig {
                capacity: 3_000,
                spawn_rate: 1.0,
                max_spawn_per_frame: 8,
                cull_level: 0.03,
                detail_scale: 1.0,
                smoothing_factor: 0.35,
                overlay_mode: false,
            },
            Self::Ultra => QualityConfig {
                capacity: 6_000,
                spawn_rate: 1.0,
                max_spawn_per_frame: 16,
                cull_level: 0.0,
                detail_scale: 1.25,
                smoothing_factor: 0.4,
                overlay_mode: false,
            },
        }
    }

    /// Lowercase name, as used for TOML keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Ultra => "ultra",
        }
    }
}

fn low_preset() -> QualityConfig {
    QualityTier::Low.config()
}

fn medium_preset() -> QualityConfig {
    QualityTier::Medium.config()
}

fn high_preset() -> QualityConfig {
    QualityTier::High.config()
}

fn ultra_preset() -> QualityConfig {
    QualityTier::Ultra.config()
}

/// One preset per tier, loaded once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityTable {
    /// Low tier.
    #[serde(default = "low_preset")]
    pub low: QualityConfig,
    /// Medium tier.
    #[serde(default = "medium_preset")]
    pub medium: QualityConfig,
    /// High tier.
    #[serde(default = "high_preset")]
    pub high: QualityConfig,
    /// Ultra tier.
    #[serde(default = "ultra_preset")]
    pub ultra: QualityConfig,
}

impl Default for QualityTable {
    fn default() -> Self {
        Self {
            low: low_preset(),
            medium: medium_preset(),
            high: high_preset(),
            ultra: ultra_preset(),
        }
    }
}

impl QualityTable {
    /// Parses and validates a table from TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let table: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Reads, parses and validates a table from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|e| {
            tracing::warn!("rejected quality table {}: {}", path.display(), e);
            e
        })
    }

    /// Validates every preset.
    pub fn validate(&self) -> ConfigResult<()> {
        for tier in QualityTier::ALL {
            self.get(tier).validate(tier.name())?;
        }
        Ok(())
    }

    /// The preset for `tier`.
    #[must_use]
    pub const fn get(&self, tier: QualityTier) -> QualityConfig {
        match tier {
            QualityTier::Low => self.low,
            QualityTier::Medium => self.medium,
            QualityTier::High => self.high,
            QualityTier::Ultra => self.ultra,
        }
    }
}
