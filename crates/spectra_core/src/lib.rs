//! # SPECTRA Core
//!
//! Allocation-free building blocks shared by every visual effect:
//! - A fixed-capacity particle pool with O(1) swap-remove compaction
//! - Small `Pod` math types
//! - A seedable random number generator owned by each simulation
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - pools are sized once per quality tier
//! 2. **Dense storage** - live elements are packed at the front of the pool
//! 3. **No global state** - randomness is injected, never shared
//!
//! ## Example
//!
//! ```rust,ignore
//! use spectra_core::{ParticlePool, SimRng};
//!
//! let mut pool: ParticlePool<Spark> = ParticlePool::new(4096);
//! let mut rng = SimRng::new(42);
//! if let Some(handle) = pool.rent() {
//!     pool.get_mut(handle).unwrap().life = rng.range(1.0, 2.0);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod math;
pub mod memory;
pub mod rng;

pub use math::{finite_or_zero, lerp, unit_clamp, Vec2};
pub use memory::{ParticlePool, PoolHandle};
pub use rng::SimRng;
