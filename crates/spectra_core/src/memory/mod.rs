//! # Memory Management
//!
//! Pre-allocated storage for simulated entities.
//!
//! ## Design Philosophy
//!
//! Storage is sized once when a quality tier is applied. During playback:
//! - No heap allocations
//! - Removal is O(1) and keeps the live set dense
//! - Indices are only valid until the next update pass

mod pool;

pub use pool::{ParticlePool, PoolHandle};
