//! # Batch Grouping
//!
//! Partitions visible particles by group key into render-ready batches.
//!
//! ## Design
//!
//! - Batch storage is reused between frames; after warm-up a frame
//!   allocates nothing.
//! - Batches appear in first-seen order. Within a batch, instances keep
//!   pool order, which is arbitrary after swap-removal.
//! - Limits clip silently. Clipped particles are counted, never reported
//!   as errors.
//! - [`RenderInstance`] is `Pod`, so a batch can be handed to the GPU as
//!   bytes without copying.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use spectra_core::{unit_clamp, Vec2};

use crate::appearance::GroupKey;
use crate::particle::Particle;

/// One drawable particle, laid out for direct upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// Screen position (px).
    pub position: [f32; 2],
    /// Drawn size (px).
    pub scale: f32,
    /// 0 = near, 1 = far.
    pub depth_hint: f32,
    /// Packed `0xRRGGBBAA`.
    pub color: u32,
    /// Opacity, `round(alpha * 255)`.
    pub alpha: u8,
    _pad: [u8; 3],
}

impl RenderInstance {
    /// Snapshot of a particle's drawable state.
    #[must_use]
    pub fn from_particle(particle: &Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            scale: particle.size,
            depth_hint: particle.depth,
            color: particle.color,
            alpha: alpha_to_u8(particle.alpha),
            _pad: [0; 3],
        }
    }
}

/// Quantizes an alpha in `[0, 1]` to a byte.
#[inline]
#[must_use]
pub fn alpha_to_u8(alpha: f32) -> u8 {
    (unit_clamp(alpha) * 255.0).round() as u8
}

/// Culling predicate supplied by the drawing layer.
pub trait Visibility {
    /// True if a particle of `size` at `position` should be drawn.
    fn is_visible(&self, position: Vec2, size: f32) -> bool;
}

impl<F> Visibility for F
where
    F: Fn(Vec2, f32) -> bool,
{
    fn is_visible(&self, position: Vec2, size: f32) -> bool {
        self(position, size)
    }
}

/// Default predicate: the frame rectangle grown by the particle's size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameBounds {
    /// Frame width (px).
    pub width: f32,
    /// Frame height (px).
    pub height: f32,
}

impl Visibility for FrameBounds {
    fn is_visible(&self, position: Vec2, size: f32) -> bool {
        let reach = size.max(0.0);
        position.x >= -reach
            && position.x <= self.width + reach
            && position.y >= -reach
            && position.y <= self.height + reach
    }
}

/// Instances sharing one group key.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    key: GroupKey,
    instances: Vec<RenderInstance>,
}

impl Batch {
    /// The shared group key.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> GroupKey {
        self.key
    }

    /// The instances.
    #[inline]
    #[must_use]
    pub fn instances(&self) -> &[RenderInstance] {
        &self.instances
    }

    /// Number of instances.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True when the batch holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The instances as raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Counts from one grouping pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupingOutcome {
    /// Instances emitted.
    pub batched: u32,
    /// Visible particles left out by the batch limits.
    pub omitted: u32,
}

/// Builds the per-frame grouped view.
#[derive(Debug)]
pub struct BatchGrouper {
    batches: Vec<Batch>,
    active: usize,
    index: HashMap<GroupKey, usize>,
    max_batches: usize,
    max_batch_size: usize,
}

impl BatchGrouper {
    /// Creates a grouper with at most `max_batches` keys of at most
    /// `max_batch_size` instances each.
    #[must_use]
    pub fn new(max_batches: usize, max_batch_size: usize) -> Self {
        Self {
            batches: Vec::new(),
            active: 0,
            index: HashMap::new(),
            max_batches,
            max_batch_size,
        }
    }

    /// Changes the limits. Takes effect on the next [`group`](Self::group).
    pub fn set_limits(&mut self, max_batches: usize, max_batch_size: usize) {
        self.max_batches = max_batches;
        self.max_batch_size = max_batch_size;
    }

    /// Drops the current view, keeping the storage.
    pub fn clear(&mut self) {
        for batch in &mut self.batches[..self.active] {
            batch.instances.clear();
        }
        self.active = 0;
        self.index.clear();
    }

    /// Regroups `particles`, replacing the previous view.
    pub fn group<V>(&mut self, particles: &[Particle], visibility: &V) -> GroupingOutcome
    where
        V: Visibility + ?Sized,
    {
        self.clear();
        let mut outcome = GroupingOutcome::default();

        for particle in particles {
            if !visibility.is_visible(particle.position, particle.size) {
                continue;
            }

            let slot = if let Some(&slot) = self.index.get(&particle.group_key) {
                slot
            } else {
                if self.active >= self.max_batches {
                    outcome.omitted += 1;
                    continue;
                }
                let slot = self.active;
                if slot == self.batches.len() {
                    self.batches.push(Batch::default());
                }
                self.batches[slot].key = particle.group_key;
                self.index.insert(particle.group_key, slot);
                self.active += 1;
                slot
            };

            let batch = &mut self.batches[slot];
            if batch.instances.len() >= self.max_batch_size {
                outcome.omitted += 1;
                continue;
            }
            batch.instances.push(RenderInstance::from_particle(particle));
            outcome.batched += 1;
        }

        outcome
    }

    /// The batches built by the last [`group`](Self::group).
    #[must_use]
    pub fn view(&self) -> GroupedView<'_> {
        GroupedView {
            batches: &self.batches[..self.active],
        }
    }
}

/// Read-only grouped output of one frame.
///
/// Borrows the engine; it must be dropped before the next `advance`.
#[derive(Clone, Copy, Debug)]
pub struct GroupedView<'a> {
    batches: &'a [Batch],
}

impl<'a> GroupedView<'a> {
    /// Iterates over the batches.
    pub fn iter(&self) -> std::slice::Iter<'a, Batch> {
        self.batches.iter()
    }

    /// The batch for `key`, if any particle with that key was drawn.
    #[must_use]
    pub fn get(&self, key: GroupKey) -> Option<&'a Batch> {
        self.batches.iter().find(|b| b.key == key)
    }

    /// Number of batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True when nothing is drawn this frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total instances across every batch.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    /// Keys present this frame.
    pub fn keys(&self) -> impl Iterator<Item = GroupKey> + 'a {
        self.batches.iter().map(Batch::key)
    }
}

impl<'a> IntoIterator for GroupedView<'a> {
    type Item = &'a Batch;
    type IntoIter = std::slice::Iter<'a, Batch>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.iter()
    }
}
