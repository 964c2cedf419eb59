//! Recycling store for homogeneous entities.
//!
//! Instances are cloned from a prototype up front and live in an arena for
//! the lifetime of the pool. Callers address them through [`PoolSlot`]
//! indices, so a recycled instance keeps its slot and no reference to it can
//! outlive a release.

use thiserror::Error;
use tracing::warn;

/// Lifecycle hooks invoked when an instance changes hands.
pub trait Poolable {
    /// Prepares the instance for use after it leaves the inactive set.
    fn on_acquire(&mut self) {}

    /// Resets the instance before it returns to the inactive set.
    fn on_release(&mut self) {}
}

/// Index of an instance inside its pool's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolSlot(usize);

impl PoolSlot {
    /// Creates a slot referring to the provided arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index of the slot.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Conditions reported by pool operations. None is fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PoolError {
    /// No inactive instance remains and the pool may not grow.
    #[error("pool for {kind} is empty and not expandable")]
    Exhausted {
        /// Label of the pooled entity type.
        kind: &'static str,
    },
    /// The slot is not a currently active member of the pool.
    #[error("slot {slot} is not an active member of the {kind} pool")]
    NotPooled {
        /// Label of the pooled entity type.
        kind: &'static str,
        /// Offending slot index.
        slot: usize,
    },
    /// Storage for the requested number of instances could not be reserved.
    #[error("cannot reserve {requested} instances for the {kind} pool")]
    CapacityOverflow {
        /// Label of the pooled entity type.
        kind: &'static str,
        /// Number of instances requested.
        requested: usize,
    },
}

/// Fixed or expandable recycling store.
#[derive(Clone, Debug)]
pub struct EntityPool<T> {
    kind: &'static str,
    prototype: T,
    expandable: bool,
    instances: Vec<T>,
    active: Vec<bool>,
    available: Vec<PoolSlot>,
    active_count: usize,
}

impl<T> EntityPool<T>
where
    T: Poolable + Clone,
{
    /// Builds a pool holding `initial_size` inactive copies of `prototype`.
    ///
    /// `kind` labels the pool in diagnostics.
    #[must_use]
    pub fn create(kind: &'static str, prototype: T, initial_size: usize, expandable: bool) -> Self {
        let mut pool = Self {
            kind,
            prototype,
            expandable,
            instances: Vec::with_capacity(initial_size),
            active: Vec::with_capacity(initial_size),
            available: Vec::with_capacity(initial_size),
            active_count: 0,
        };
        pool.prewarm(initial_size);
        pool
    }

    /// Like [`EntityPool::create`], but fails instead of aborting when the
    /// storage for `initial_size` instances cannot be reserved.
    pub fn try_create(
        kind: &'static str,
        prototype: T,
        initial_size: usize,
        expandable: bool,
    ) -> Result<Self, PoolError> {
        let mut pool = Self {
            kind,
            prototype,
            expandable,
            instances: Vec::new(),
            active: Vec::new(),
            available: Vec::new(),
            active_count: 0,
        };
        pool.try_reserve(initial_size)?;
        pool.prewarm(initial_size);
        Ok(pool)
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), PoolError> {
        let kind = self.kind;
        let overflow = move |_| PoolError::CapacityOverflow {
            kind,
            requested: additional,
        };
        self.instances.try_reserve_exact(additional).map_err(overflow)?;
        self.active.try_reserve_exact(additional).map_err(overflow)?;
        self.available.try_reserve_exact(additional).map_err(overflow)?;
        Ok(())
    }

    /// Adds `amount` inactive instances to the pool.
    pub fn prewarm(&mut self, amount: usize) {
        let first = self.instances.len();
        for _ in 0..amount {
            let _ = self.instantiate();
        }
        // The available list is a stack; its lowest slot sits on top.
        self.available
            .extend((first..first + amount).rev().map(PoolSlot::new));
    }

    /// Takes an inactive instance, growing the pool if permitted.
    pub fn acquire(&mut self) -> Result<PoolSlot, PoolError> {
        let slot = match self.available.pop() {
            Some(slot) => slot,
            None if self.expandable => self.instantiate(),
            None => {
                warn!(kind = self.kind, "pool is empty and not expandable");
                return Err(PoolError::Exhausted { kind: self.kind });
            }
        };

        self.active[slot.0] = true;
        self.active_count += 1;
        self.instances[slot.0].on_acquire();
        Ok(slot)
    }

    /// Returns an active instance to the inactive set.
    pub fn release(&mut self, slot: PoolSlot) -> Result<(), PoolError> {
        if !self.is_active(slot) {
            warn!(
                kind = self.kind,
                slot = slot.0,
                "attempted to release an instance that is not active in this pool"
            );
            return Err(PoolError::NotPooled {
                kind: self.kind,
                slot: slot.0,
            });
        }

        self.instances[slot.0].on_release();
        self.active[slot.0] = false;
        self.active_count -= 1;
        self.available.push(slot);
        Ok(())
    }

    /// Releases every active instance, returning how many were released.
    ///
    /// Slots are released highest first so the next acquisitions hand out
    /// the lowest slots again.
    pub fn release_all(&mut self) -> usize {
        let mut active: Vec<PoolSlot> = self.iter_active().map(|(slot, _)| slot).collect();
        active.reverse();
        let mut released = 0;
        for slot in active {
            if self.release(slot).is_ok() {
                released += 1;
            }
        }
        released
    }

    fn instantiate(&mut self) -> PoolSlot {
        let slot = PoolSlot(self.instances.len());
        self.instances.push(self.prototype.clone());
        self.active.push(false);
        slot
    }
}

impl<T> EntityPool<T> {
    /// Label used for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Reports whether the pool may synthesize instances on demand.
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    /// Reports whether the slot is currently handed out.
    #[must_use]
    pub fn is_active(&self, slot: PoolSlot) -> bool {
        self.active.get(slot.0).copied().unwrap_or(false)
    }

    /// Reports whether the slot belongs to this pool, active or not.
    #[must_use]
    pub fn contains(&self, slot: PoolSlot) -> bool {
        slot.0 < self.instances.len()
    }

    /// Borrows an active instance.
    #[must_use]
    pub fn get(&self, slot: PoolSlot) -> Option<&T> {
        if self.is_active(slot) {
            self.instances.get(slot.0)
        } else {
            None
        }
    }

    /// Mutably borrows an active instance.
    pub fn get_mut(&mut self, slot: PoolSlot) -> Option<&mut T> {
        if self.is_active(slot) {
            self.instances.get_mut(slot.0)
        } else {
            None
        }
    }

    /// Iterates active instances in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolSlot, &T)> {
        self.instances
            .iter()
            .enumerate()
            .filter(|(index, _)| self.active[*index])
            .map(|(index, instance)| (PoolSlot(index), instance))
    }

    /// Mutably iterates active instances in slot order.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolSlot, &mut T)> {
        let active = &self.active;
        self.instances
            .iter_mut()
            .enumerate()
            .filter(|(index, _)| active[*index])
            .map(|(index, instance)| (PoolSlot(index), instance))
    }

    /// Number of instances currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Number of instances waiting to be acquired.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Number of instances ever created by the pool.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.instances.len()
    }
}
