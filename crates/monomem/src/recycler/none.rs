//! Recycling disabled.

use std::marker::PhantomData;
use std::ptr::NonNull;

use super::Recycler;
use crate::list::ForwardNode;

/// The disabled strategy: a zero-sized recycler that stocks nothing.
///
/// Erased nodes are simply abandoned in their arena and come back with the
/// next arena reset. Appropriate for containers that only grow between
/// resets, where recycling bookkeeping is pure overhead.
#[derive(Debug)]
pub struct NoRecycler<T: ForwardNode> {
    _marker: PhantomData<T>,
}

impl<T: ForwardNode> Clone for NoRecycler<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ForwardNode> Copy for NoRecycler<T> {}

impl<T: ForwardNode> Default for NoRecycler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ForwardNode> NoRecycler<T> {
    /// Creates the (stateless) recycler.
    #[must_use]
    pub const fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T: ForwardNode> Recycler<T> for NoRecycler<T> {
    const RECYCLING: bool = false;

    fn get(&mut self) -> Option<NonNull<T>> {
        None
    }

    unsafe fn recycle(&mut self, _node: NonNull<T>) {}

    unsafe fn recycle_range(&mut self, _first: NonNull<T>, _last: NonNull<T>) {}

    unsafe fn recycle_chunk(&mut self, _chunk: NonNull<u8>, _size: usize) -> usize {
        0
    }

    fn count(&self) -> usize {
        0
    }

    fn dispose_if_private(&mut self) {}
}
