//! # Configuration Error Types
//!
//! Only configuration can fail. The per-frame path degrades silently and
//! never returns an error.

use thiserror::Error;

/// Errors raised while loading or validating simulation configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("cannot read configuration file {path}: {reason}")]
    Io {
        /// The file that was requested.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// A pool capacity of zero would never hold a particle.
    #[error("{tier}: capacity must be greater than zero")]
    ZeroCapacity {
        /// The offending preset.
        tier: String,
    },

    /// A field was outside its permitted range.
    #[error("{field} = {value} is out of range ({expected})")]
    OutOfRange {
        /// The field name.
        field: &'static str,
        /// The rejected value.
        value: f32,
        /// Human-readable description of the valid range.
        expected: &'static str,
    },

    /// A size would reserve more memory than any frame can use.
    #[error("{field} = {value} exceeds the maximum of {max}")]
    TooLarge {
        /// The field name.
        field: &'static str,
        /// The rejected value.
        value: usize,
        /// The largest accepted value.
        max: usize,
    },

    /// A batch limit of zero would produce an empty view every frame.
    #[error("{field} must be greater than zero")]
    ZeroBatchLimit {
        /// The field name.
        field: &'static str,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fails with [`ConfigError::OutOfRange`] unless `ok` holds and `value` is finite.
pub(crate) fn check(
    ok: bool,
    field: &'static str,
    value: f32,
    expected: &'static str,
) -> ConfigResult<()> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected,
        })
    }
}
