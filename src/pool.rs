//! A reusable-object pool with O(1) obtain and release.
//!
//! Storage is partitioned at all times into an active prefix
//! `[0, fresh_index)` and an inactive suffix `[fresh_index, len)`. Releasing
//! an object swaps it with the last active slot and shrinks the prefix, so
//! neither operation ever shifts the rest of the storage. Objects are shared
//! as `Rc<RefCell<T>>` so a caller can keep a handle across releases of other
//! objects; the object's [`PoolMeta`] index is kept in sync on every swap.

use std::cell::RefCell;
use std::rc::Rc;

/// Bookkeeping every pooled object carries. The index always matches the
/// object's current position in the pool's storage while the object is
/// active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolMeta {
    pub(crate) index: usize,
    pub(crate) in_use: bool,
}

impl PoolMeta {
    /// Position of the object in pool storage. Only meaningful while the
    /// object is active.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the object is currently obtained from its pool.
    pub fn in_use(&self) -> bool {
        self.in_use
    }
}

/// Implemented by types that can live in a [`Pool`].
pub trait Pooled {
    fn pool_meta(&self) -> &PoolMeta;
    fn pool_meta_mut(&mut self) -> &mut PoolMeta;
}

/// Verdict returned by a [`Pool::for_each_active`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolAction {
    /// Keep the visited object active.
    Keep,
    /// Release the visited object back to the pool.
    Release,
}

pub struct Pool<T: Pooled> {
    factory: Box<dyn FnMut() -> T>,
    slots: Vec<Rc<RefCell<T>>>,
    fresh_index: usize,
}

impl<T: Pooled> Pool<T> {
    /// Create a pool pre-populated with `init_count` instances from
    /// `factory`. Storage only ever grows from here; it is never shrunk.
    pub fn new(mut factory: impl FnMut() -> T + 'static, init_count: usize) -> Self {
        let mut slots = Vec::with_capacity(init_count);
        for index in 0..init_count {
            let mut obj = factory();
            *obj.pool_meta_mut() = PoolMeta {
                index,
                in_use: false,
            };
            slots.push(Rc::new(RefCell::new(obj)));
        }
        Self {
            factory: Box::new(factory),
            slots,
            fresh_index: 0,
        }
    }

    /// Obtain the next inactive object, growing storage by one instance when
    /// the inactive suffix is empty.
    pub fn obtain(&mut self) -> Rc<RefCell<T>> {
        self.obtain_with(|_| {})
    }

    /// Obtain an object and run `update` on it before it is handed out. The
    /// update hook is where call sites reset recycled state.
    pub fn obtain_with(&mut self, update: impl FnOnce(&mut T)) -> Rc<RefCell<T>> {
        if self.fresh_index == self.slots.len() {
            let obj = (self.factory)();
            self.slots.push(Rc::new(RefCell::new(obj)));
            log::trace!("pool grew to {} slots", self.slots.len());
        }
        let slot = self.slots[self.fresh_index].clone();
        {
            let mut obj = slot.borrow_mut();
            *obj.pool_meta_mut() = PoolMeta {
                index: self.fresh_index,
                in_use: true,
            };
            update(&mut obj);
        }
        self.fresh_index += 1;
        slot
    }

    /// Return `obj` to the pool. A no-op returning `false` if the object is
    /// not currently active in this pool, which makes double releases safe at
    /// call sites.
    pub fn release(&mut self, obj: &Rc<RefCell<T>>) -> bool {
        let index = {
            let meta = *obj.borrow().pool_meta();
            if !meta.in_use {
                return false;
            }
            meta.index
        };
        if index >= self.fresh_index || !Rc::ptr_eq(&self.slots[index], obj) {
            // Stale metadata from another pool, or a slot this pool already
            // recycled.
            return false;
        }
        self.release_at(index);
        true
    }

    /// Release the active object stored at `index`, swapping it with the last
    /// active slot.
    fn release_at(&mut self, index: usize) {
        debug_assert!(index < self.fresh_index);
        let last = self.fresh_index - 1;
        self.slots.swap(index, last);
        self.slots[index].borrow_mut().pool_meta_mut().index = index;
        {
            let mut released = self.slots[last].borrow_mut();
            let meta = released.pool_meta_mut();
            meta.index = last;
            meta.in_use = false;
        }
        self.fresh_index = last;
        debug_assert!(self.check_partition());
    }

    /// Visit every active object from `fresh_index - 1` down to `0`. The
    /// downward direction means a callback may release the object it is
    /// currently visiting without skipping or revisiting another live object:
    /// the swap partner always sits at an index the iteration has already
    /// passed.
    pub fn for_each_active(&mut self, mut f: impl FnMut(&Rc<RefCell<T>>) -> PoolAction) {
        let mut index = self.fresh_index;
        while index > 0 {
            index -= 1;
            if index >= self.fresh_index {
                // Another slot was released by the callback; clamp back into
                // the shrunken prefix.
                continue;
            }
            let slot = self.slots[index].clone();
            if f(&slot) == PoolAction::Release {
                self.release_at(index);
            }
        }
    }

    /// Deactivate every object without physically reordering storage.
    pub fn release_all(&mut self) {
        for slot in &self.slots[..self.fresh_index] {
            slot.borrow_mut().pool_meta_mut().in_use = false;
        }
        self.fresh_index = 0;
    }

    pub fn active_count(&self) -> usize {
        self.fresh_index
    }

    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    /// Partition invariant: every active object's stored index matches its
    /// position, everything past `fresh_index` is inactive.
    fn check_partition(&self) -> bool {
        self.slots.iter().enumerate().all(|(i, slot)| {
            let meta = *slot.borrow().pool_meta();
            meta.index == i && meta.in_use == (i < self.fresh_index)
        })
    }
}
