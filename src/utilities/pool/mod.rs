//! Generic object pool.
//!
//! Instances are created once (up front or on exhaustion) and then recycled between a
//! free list and an active set. Nothing is deallocated until the pool itself is dropped.
//!
//! ```text
//!   acquire:  free.pop() ──► Active            (free empty → factory → Active)
//!   release:  Active ──► free.push()           (not Active → reported, no-op)
//! ```
//!
//! # Invariants
//! - Every created instance is in exactly one of {free, active}.
//! - `active_count() + free_count() == total_created_count()` after every call.
//! - `on_created` runs exactly once per instance, right after the factory.
//!
//! The factory receives a caller-supplied context. Plain pools use `()`; ECS pools use
//! `World` so they can spawn entities when they grow.

use bevy::log::error;

/// Stable reference to one pooled instance. Valid for the lifetime of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle(u32);

impl PoolHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The handle exists but is already free (double release).
    NotActive(PoolHandle),
    /// The handle was never issued by this pool.
    UnknownHandle(PoolHandle),
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::NotActive(h) => {
                write!(f, "Pool entry {} is not active. Was it released twice?", h.0)
            }
            PoolError::UnknownHandle(h) => write!(f, "Pool has no entry {}", h.0),
        }
    }
}

impl std::error::Error for PoolError {}

type Factory<T, Ctx> = Box<dyn FnMut(&mut Ctx) -> T + Send + Sync>;
type CreatedHook<T, Ctx> = Box<dyn FnMut(&mut T, &mut Ctx) + Send + Sync>;

pub struct ObjectPool<T, Ctx = ()> {
    items: Vec<T>,
    slots: Vec<Slot>,
    /// Stack; the most recently released entry is reused first.
    free: Vec<PoolHandle>,
    active: usize,
    factory: Factory<T, Ctx>,
    on_created: Option<CreatedHook<T, Ctx>>,
}

impl<T, Ctx> std::fmt::Debug for ObjectPool<T, Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("total", &self.items.len())
            .field("active", &self.active)
            .field("free", &self.free.len())
            .finish()
    }
}

impl<T, Ctx> ObjectPool<T, Ctx> {
    pub fn new(factory: impl FnMut(&mut Ctx) -> T + Send + Sync + 'static) -> Self {
        Self {
            items: Vec::new(),
            slots: Vec::new(),
            free: Vec::new(),
            active: 0,
            factory: Box::new(factory),
            on_created: None,
        }
    }

    /// Post-creation initializer. Runs once per instance, never on re-acquire.
    pub fn with_on_created(
        mut self,
        hook: impl FnMut(&mut T, &mut Ctx) + Send + Sync + 'static,
    ) -> Self {
        self.on_created = Some(Box::new(hook));
        self
    }

    fn create(&mut self, ctx: &mut Ctx, slot: Slot) -> PoolHandle {
        let mut item = (self.factory)(ctx);
        if let Some(hook) = self.on_created.as_mut() {
            hook(&mut item, ctx);
        }

        let handle = PoolHandle(self.items.len() as u32);
        self.items.push(item);
        self.slots.push(slot);
        handle
    }

    /// Create `n` instances, all free.
    pub fn preallocate_in(&mut self, n: usize, ctx: &mut Ctx) {
        self.items.reserve(n);
        self.slots.reserve(n);
        self.free.reserve(n);

        for _ in 0..n {
            let h = self.create(ctx, Slot::Free);
            self.free.push(h);
        }
    }

    /// Take a free instance, or grow the pool by one if none is free.
    ///
    /// The caller owns releasing it again.
    pub fn acquire_in(&mut self, ctx: &mut Ctx) -> PoolHandle {
        let h = match self.free.pop() {
            Some(h) => {
                self.slots[h.index()] = Slot::Active;
                h
            }
            None => self.create(ctx, Slot::Active),
        };
        self.active += 1;
        h
    }

    pub fn try_release(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        match self.slots.get_mut(handle.index()) {
            None => Err(PoolError::UnknownHandle(handle)),
            Some(Slot::Free) => Err(PoolError::NotActive(handle)),
            Some(slot) => {
                *slot = Slot::Free;
                self.free.push(handle);
                self.active -= 1;
                Ok(())
            }
        }
    }

    /// Return an instance to the pool. Misuse is reported and otherwise ignored.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        match self.try_release(handle) {
            Ok(()) => true,
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    #[inline]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.items.get(handle.index())
    }

    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.items.get_mut(handle.index())
    }

    #[inline]
    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.slots.get(handle.index()) == Some(&Slot::Active)
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn total_created_count(&self) -> usize {
        self.items.len()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.items
            .iter()
            .zip(&self.slots)
            .enumerate()
            .filter(|(_, (_, slot))| **slot == Slot::Active)
            .map(|(i, (item, _))| (PoolHandle(i as u32), item))
    }
}

impl<T> ObjectPool<T, ()> {
    pub fn preallocate(&mut self, n: usize) {
        self.preallocate_in(n, &mut ());
    }

    pub fn acquire(&mut self) -> PoolHandle {
        self.acquire_in(&mut ())
    }
}
