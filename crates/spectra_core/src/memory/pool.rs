//! # Particle Pool
//!
//! Fixed-capacity dense storage with swap-remove compaction.

/// A fixed-capacity pool of simulated entities.
///
/// Live elements always occupy `[0, len)`. Removing an element swaps the
/// last live element into its slot and shrinks the live count, so removal
/// is O(1) but element order is not preserved.
///
/// Slots in `[len, initialized)` were vacated by earlier removals. They
/// form the pool's free list and are recycled by [`rent`](Self::rent)
/// before any fresh slot is initialized. A recycled slot keeps whatever
/// data it held when it died; callers overwrite every field they care about.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned by exactly one simulation.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Spark { x: f32, life: f32 }
///
/// let mut pool: ParticlePool<Spark> = ParticlePool::new(1000);
///
/// // Rent - O(1), no heap allocation once warmed up
/// let handle = pool.rent()?;
/// pool.get_mut(handle)?.life = 1.0;
///
/// // Update and compact in a single pass
/// pool.retain_mut(|s| { s.life -= 0.1; s.life > 0.0 });
/// ```
#[derive(Debug)]
pub struct ParticlePool<T> {
    /// Initialized slots. Only `[0, count)` is live.
    storage: Vec<T>,
    /// Number of live elements.
    count: usize,
    /// Maximum number of live elements.
    capacity: usize,
}

/// Handle to a live element in a pool.
///
/// A handle is an index and is invalidated by any removal, because removal
/// moves the tail element into the vacated slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    /// Index into the pool.
    index: usize,
}

impl PoolHandle {
    /// Returns the slot index this handle refers to.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl<T: Default> ParticlePool<T> {
    /// Creates a new pool with the specified capacity.
    ///
    /// Backing memory for `capacity` elements is reserved upfront.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of live elements
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity),
            count: 0,
            capacity,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of live elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no element is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of elements that can still be rented.
    #[inline]
    #[must_use]
    pub const fn free_count(&self) -> usize {
        self.capacity - self.count
    }

    /// Returns the number of vacated slots waiting to be recycled.
    #[inline]
    #[must_use]
    pub fn recycled_count(&self) -> usize {
        self.storage.len() - self.count
    }

    /// Rents a slot.
    ///
    /// Recycles a vacated slot when one exists, otherwise initializes a
    /// fresh `T::default()` slot while under capacity.
    ///
    /// # Returns
    ///
    /// A handle to the rented slot, or None if the pool is full. A full
    /// pool is not an error: the caller simply drops its request.
    pub fn rent(&mut self) -> Option<PoolHandle> {
        if self.count >= self.capacity {
            return None;
        }

        if self.count == self.storage.len() {
            self.storage.push(T::default());
        }

        let index = self.count;
        self.count += 1;

        Some(PoolHandle { index })
    }

    /// Removes the element at `index` by swapping the last live element
    /// into its place.
    ///
    /// Code that removes while walking the pool must not advance its
    /// cursor after a removal: the slot now holds an unvisited element.
    ///
    /// # Returns
    ///
    /// False if `index` was not live.
    pub fn remove_swap(&mut self, index: usize) -> bool {
        if index >= self.count {
            return false;
        }

        let last = self.count - 1;
        self.storage.swap(index, last);
        self.count = last;

        true
    }

    /// Gets a reference to a live element.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.as_slice().get(handle.index)
    }

    /// Gets a mutable reference to a live element.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.as_mut_slice().get_mut(handle.index)
    }

    /// Applies `f` to every live element in place.
    pub fn each_mut<F: FnMut(&mut T)>(&mut self, f: F) {
        self.as_mut_slice().iter_mut().for_each(f);
    }

    /// Visits every live element once and removes those for which `keep`
    /// returns false.
    ///
    /// This is the combined update-and-compact traversal: `keep` may mutate
    /// the element before deciding its fate.
    ///
    /// # Returns
    ///
    /// The number of removed elements.
    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, mut keep: F) -> usize {
        let mut removed = 0;
        let mut cursor = 0;

        while cursor < self.count {
            if keep(&mut self.storage[cursor]) {
                cursor += 1;
            } else {
                self.remove_swap(cursor);
                removed += 1;
            }
        }

        removed
    }

    /// Live elements as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.count]
    }

    /// Live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage[..self.count]
    }

    /// Iterates over all live elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Kills every element. Memory is kept for recycling.
    #[inline]
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Empties the pool and changes its capacity.
    ///
    /// This is the only call that may allocate or free memory.
    pub fn reset(&mut self, capacity: usize) {
        self.storage.clear();
        self.storage.shrink_to(capacity);
        self.storage.reserve_exact(capacity);
        self.count = 0;
        self.capacity = capacity;
    }
}
