//! Node recycling strategies for arena-backed containers.
//!
//! A container on top of a [`MonoAllocator`](crate::arena::MonoAllocator)
//! cannot free erased nodes individually — the arena has no free operation.
//! Instead it hands dead nodes to a recycler, and asks the recycler first
//! when it needs a fresh one. Three strategies exist, selected at compile
//! time through a generic parameter, so the choice is monomorphized away:
//!
//! - [`PrivateRecycler`]: the container keeps its own freelist. Zero
//!   overhead per operation, but nodes erased in one container never help
//!   another.
//! - [`SharedRecycler`]: several containers of node-compatible type feed a
//!   jointly owned [`SharedRecyclerPool`]. Erase in one, reuse in another.
//! - [`NoRecycler`]: recycling disabled; erased nodes are abandoned until
//!   the arena resets. Right when a container only ever grows.
//!
//! All strategies are single-threaded, like the arena they complement.

mod none;
mod private;
mod shared;

use std::ptr::NonNull;

pub use none::NoRecycler;
pub use private::PrivateRecycler;
pub use shared::{SharedRecycler, SharedRecyclerPool};

use crate::list::ForwardNode;

/// Common surface of the three recycling strategies.
///
/// The `unsafe` methods share one contract: node pointers handed in must
/// point to valid, exclusively surrendered storage for `T` that outlives
/// the recycler (arena storage until the owning arena resets, for the
/// typical case).
pub trait Recycler<T: ForwardNode> {
    /// `false` only for the disabled strategy; lets containers skip
    /// recycling bookkeeping entirely at compile time.
    const RECYCLING: bool;

    /// Takes a recycled node, if one is stocked.
    ///
    /// Returns dead storage: the caller initializes it before use. On
    /// `None` the caller allocates from its arena instead.
    fn get(&mut self) -> Option<NonNull<T>>;

    /// Stocks a single erased node.
    ///
    /// # Safety
    ///
    /// `node` must satisfy the trait-level storage contract and must not be
    /// reachable from anywhere else afterwards.
    unsafe fn recycle(&mut self, node: NonNull<T>);

    /// Stocks a pre-linked chain `first -> ... -> last` in O(1).
    ///
    /// # Safety
    ///
    /// `last` must be reachable from `first` via the nodes' links and every
    /// chain node must satisfy the trait-level storage contract.
    unsafe fn recycle_range(&mut self, first: NonNull<T>, last: NonNull<T>);

    /// Slices a raw chunk (for example, a bucket array a container has
    /// outgrown) into nodes and stocks them. Returns the number gained.
    ///
    /// # Safety
    ///
    /// `chunk..chunk + size` must be valid, writable memory surrendered to
    /// the recycler for the rest of its lifetime.
    unsafe fn recycle_chunk(&mut self, chunk: NonNull<u8>, size: usize) -> usize;

    /// Number of stocked nodes. O(n); diagnostics and tests only.
    fn count(&self) -> usize;

    /// Drops all stocked nodes *if this strategy owns them privately*.
    ///
    /// Call before resetting the arena the nodes live in. Shared strategies
    /// do nothing here — their pool, and the arena behind it, is managed by
    /// the pool's owner. Disabled strategies have nothing to do.
    fn dispose_if_private(&mut self);
}
