//! Container-private recycling.

use std::ptr::NonNull;

use super::Recycler;
use crate::list::{ForwardList, ForwardNode};

/// A recycler that owns its freelist.
///
/// Erased nodes stay with the container that erased them. Moving the
/// container moves the stock along; *cloning* it deliberately does not —
/// the clone starts with an empty stock, because the nodes' storage belongs
/// to the original's arena lifecycle, not the copy's.
#[derive(Debug)]
pub struct PrivateRecycler<T: ForwardNode> {
    stock: ForwardList<T>,
}

impl<T: ForwardNode> Default for PrivateRecycler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ForwardNode> PrivateRecycler<T> {
    /// Creates a recycler with an empty stock.
    #[must_use]
    pub const fn new() -> Self {
        Self { stock: ForwardList::new() }
    }
}

impl<T: ForwardNode> Recycler<T> for PrivateRecycler<T> {
    const RECYCLING: bool = true;

    fn get(&mut self) -> Option<NonNull<T>> {
        self.stock.pop_front()
    }

    unsafe fn recycle(&mut self, node: NonNull<T>) {
        // SAFETY: forwarded contract.
        unsafe { self.stock.push_front(node) };
    }

    unsafe fn recycle_range(&mut self, first: NonNull<T>, last: NonNull<T>) {
        // SAFETY: forwarded contract.
        unsafe { self.stock.push_front_range(first, last) };
    }

    unsafe fn recycle_chunk(&mut self, chunk: NonNull<u8>, size: usize) -> usize {
        // SAFETY: forwarded contract.
        unsafe { self.stock.recycle_chunk(chunk, size) }
    }

    fn count(&self) -> usize {
        self.stock.count()
    }

    fn dispose_if_private(&mut self) {
        self.stock.clear();
    }
}

/// Clones to an *empty* recycler. The stock's nodes are tied to the
/// original's storage; sharing them through a copy would double-recycle.
impl<T: ForwardNode> Clone for PrivateRecycler<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}
