//! Recycling through a jointly owned pool.

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use super::Recycler;
use crate::list::{ForwardList, ForwardNode};

/// The externally owned stock behind [`SharedRecycler`]s.
///
/// Create one pool, hand a handle to every container whose nodes should be
/// interchangeable, and keep the pool (plus the arena the nodes live in)
/// alive for as long as any of them. Handles are cheap `Rc` clones;
/// everything is single-threaded.
#[derive(Debug)]
pub struct SharedRecyclerPool<T: ForwardNode> {
    stock: Rc<RefCell<ForwardList<T>>>,
}

impl<T: ForwardNode> Default for SharedRecyclerPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ForwardNode> SharedRecyclerPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self { stock: Rc::new(RefCell::new(ForwardList::new())) }
    }

    /// Number of stocked nodes across all attached recyclers. O(n).
    #[must_use]
    pub fn count(&self) -> usize {
        self.stock.borrow().count()
    }

    /// Forgets all stocked nodes. Call before resetting the arena the
    /// nodes live in.
    pub fn clear(&self) {
        self.stock.borrow_mut().clear();
    }
}

impl<T: ForwardNode> Clone for SharedRecyclerPool<T> {
    fn clone(&self) -> Self {
        Self { stock: Rc::clone(&self.stock) }
    }
}

/// A recycler that feeds a [`SharedRecyclerPool`].
///
/// Nodes erased through any handle become available to every other handle
/// of the same pool. [`dispose_if_private`](Recycler::dispose_if_private)
/// is a no-op: the stock is not this recycler's to drop.
#[derive(Debug, Clone)]
pub struct SharedRecycler<T: ForwardNode> {
    pool: SharedRecyclerPool<T>,
}

impl<T: ForwardNode> SharedRecycler<T> {
    /// Attaches a new recycler to `pool`.
    #[must_use]
    pub fn new(pool: &SharedRecyclerPool<T>) -> Self {
        Self { pool: pool.clone() }
    }
}

impl<T: ForwardNode> Recycler<T> for SharedRecycler<T> {
    const RECYCLING: bool = true;

    fn get(&mut self) -> Option<NonNull<T>> {
        self.pool.stock.borrow_mut().pop_front()
    }

    unsafe fn recycle(&mut self, node: NonNull<T>) {
        // SAFETY: forwarded contract.
        unsafe { self.pool.stock.borrow_mut().push_front(node) };
    }

    unsafe fn recycle_range(&mut self, first: NonNull<T>, last: NonNull<T>) {
        // SAFETY: forwarded contract.
        unsafe { self.pool.stock.borrow_mut().push_front_range(first, last) };
    }

    unsafe fn recycle_chunk(&mut self, chunk: NonNull<u8>, size: usize) -> usize {
        // SAFETY: forwarded contract.
        unsafe { self.pool.stock.borrow_mut().recycle_chunk(chunk, size) }
    }

    fn count(&self) -> usize {
        self.pool.count()
    }

    /// No-op. The pool owner decides when the stock dies.
    fn dispose_if_private(&mut self) {}
}
