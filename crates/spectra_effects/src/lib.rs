//! # SPECTRA Effects
//!
//! Audio-reactive particle simulation. A spectrum snapshot goes in once per
//! frame; a grouped, render-ready view comes out.
//!
//! ## Pipeline
//!
//! 1. [`SpawnSlotTable`] smooths each band's magnitude
//! 2. [`SpawnController`] turns loud bands into new particles
//! 3. [`PhysicsIntegrator`] moves every live particle
//! 4. [`LifecycleManager`] fades and prunes them
//! 5. [`BatchGrouper`] groups survivors by key for the drawing layer
//!
//! ## Architecture Rules
//!
//! 1. **Bounded work** - every frame is O(capacity), no allocation after warm-up
//! 2. **No hard failures per frame** - bad input degrades to zero, full pools drop spawns
//! 3. **Deterministic** - same seed, same frames, same particles
//!
//! ## Example
//!
//! ```rust,ignore
//! use spectra_effects::{EffectPhysicsPolicy, EngineConfig, FrameMetrics, QualityTier, SimulationEngine};
//!
//! let mut engine = SimulationEngine::new(
//!     EffectPhysicsPolicy::falling_drops(),
//!     QualityTier::High.config(),
//!     EngineConfig::default(),
//! )?;
//!
//! let view = engine.advance(&spectrum, FrameMetrics::new(1920.0, 1080.0, dt));
//! for batch in view {
//!     renderer.draw(batch.key(), batch.as_bytes());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod appearance;
pub mod batch;
pub mod engine;
pub mod error;
pub mod frame;
pub mod lifecycle;
pub mod particle;
pub mod physics;
pub mod policy;
pub mod quality;
pub mod slots;
pub mod spawn;
pub mod stats;

pub use appearance::{Appearance, BandedPalette, GlyphAppearance, GroupKey, Style};
pub use batch::{Batch, BatchGrouper, FrameBounds, GroupedView, RenderInstance, Visibility};
pub use engine::{EngineConfig, SimulationEngine, MAX_BANDS};
pub use error::{ConfigError, ConfigResult};
pub use frame::{FrameMetrics, MAX_DT, MIN_DT};
pub use lifecycle::{DecayCurve, LifeOutcome, LifecycleManager};
pub use particle::Particle;
pub use physics::{PhysicsIntegrator, Region, StepOutcome};
pub use policy::{BoundaryMode, EffectPhysicsPolicy, SpawnOrigin};
pub use quality::{QualityConfig, QualityTable, QualityTier, MAX_CAPACITY};
pub use slots::{SpawnSlot, SpawnSlotTable};
pub use spawn::{SlotState, SpawnController, SpawnOutcome};
pub use stats::{EngineStats, FrameStats};

pub use spectra_core::{SimRng, Vec2};
