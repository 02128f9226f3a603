//! Intrusive singly linked freelist.
//!
//! The link pointer lives *inside* the listed element, so keeping a node on
//! a freelist costs no extra memory: dead nodes store the link in bytes the
//! live object used for its payload. This is the backbone of the
//! [`recycler`](crate::recycler) strategies.

use std::mem;
use std::ptr::NonNull;

use tracing::warn;

use crate::utils::align_up;

/// Contract for types that embed a freelist link.
///
/// # Safety
///
/// Implementations must read and write the link through the given raw
/// pointer only, without constructing a reference to the whole node. Nodes
/// on a freelist are dead storage: apart from the link, their bytes may be
/// uninitialized (for example, slices produced by
/// [`ForwardList::recycle_chunk`]). The link must live at a fixed offset
/// within `Self` and be valid whenever the node is reachable from a list.
pub unsafe trait ForwardNode: Sized {
    /// Reads the embedded link.
    ///
    /// # Safety
    ///
    /// `node` must point to storage where the link bytes are initialized.
    unsafe fn next(node: NonNull<Self>) -> Option<NonNull<Self>>;

    /// Writes the embedded link.
    ///
    /// # Safety
    ///
    /// `node` must point to writable storage for `Self`, exclusively
    /// accessible to the caller.
    unsafe fn set_next(node: NonNull<Self>, next: Option<NonNull<Self>>);
}

/// A singly linked LIFO list of intrusive nodes.
///
/// The list does not own its nodes' storage — they live in an arena or on
/// the heap, managed by whoever pushed them. Dropping the list drops only
/// the head pointer.
///
/// [`count`](Self::count) walks the list and is intended for diagnostics
/// and tests, not hot paths.
#[derive(Debug)]
pub struct ForwardList<T: ForwardNode> {
    head: Option<NonNull<T>>,
}

impl<T: ForwardNode> ForwardList<T> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// `true` if no node is stacked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Pushes a single node onto the stack.
    ///
    /// # Safety
    ///
    /// `node` must point to valid storage for `T`, must not already be on
    /// any list, and must stay untouched by the caller until popped.
    pub unsafe fn push_front(&mut self, node: NonNull<T>) {
        // SAFETY: exclusive access to `node` is the caller's contract.
        unsafe { T::set_next(node, self.head) };
        self.head = Some(node);
    }

    /// Splices a pre-linked chain `first -> ... -> last` onto the stack in
    /// O(1).
    ///
    /// # Safety
    ///
    /// `last` must be reachable from `first` through the nodes' links, every
    /// node on that chain must satisfy the [`push_front`](Self::push_front)
    /// contract, and none of them may already be on another list.
    pub unsafe fn push_front_range(&mut self, first: NonNull<T>, last: NonNull<T>) {
        // SAFETY: exclusive access to the chain is the caller's contract.
        unsafe { T::set_next(last, self.head) };
        self.head = Some(first);
    }

    /// Pops the most recently pushed node, if any.
    ///
    /// The returned storage is dead: its non-link bytes are unspecified and
    /// the caller is expected to initialize it before use.
    pub fn pop_front(&mut self) -> Option<NonNull<T>> {
        let node = self.head?;
        // SAFETY: `node` was pushed under the contract of `push_front`, so
        // its link bytes are initialized and readable.
        self.head = unsafe { T::next(node) };
        Some(node)
    }

    /// Number of stacked nodes. O(n).
    #[must_use]
    pub fn count(&self) -> usize {
        let mut n = 0;
        let mut it = self.head;
        while let Some(node) = it {
            n += 1;
            // SAFETY: every reachable node was pushed with initialized link
            // bytes.
            it = unsafe { T::next(node) };
        }
        n
    }

    /// Forgets all nodes. Their storage is untouched; reclaiming it is the
    /// storage owner's business (typically an arena reset).
    pub fn clear(&mut self) {
        self.head = None;
    }

    /// Slices a chunk of raw memory into node-sized pieces and pushes each.
    ///
    /// The start is aligned up for `T`; whatever does not fit a whole node
    /// is left unused. Returns the number of nodes gained. A chunk too
    /// small to yield a single node is reported with a `warn!` event, since
    /// it usually indicates a sizing bug at the call site.
    ///
    /// # Safety
    ///
    /// `chunk..chunk + size` must be valid, writable memory exclusively
    /// handed over to this list, and must stay valid while any node sliced
    /// from it can still be popped.
    pub unsafe fn recycle_chunk(&mut self, chunk: NonNull<u8>, size: usize) -> usize {
        debug_assert!(mem::size_of::<T>() > 0, "cannot slice zero-sized nodes");
        let start = align_up(chunk.as_ptr() as usize, mem::align_of::<T>());
        let mut avail = size.saturating_sub(start - chunk.as_ptr() as usize);

        let mut gained = 0;
        let mut at = start;
        while avail >= mem::size_of::<T>() {
            // SAFETY: `at` lies within the caller's chunk, is aligned for
            // `T`, and has room for a full node.
            unsafe { self.push_front(NonNull::new_unchecked(at as *mut T)) };
            at += mem::size_of::<T>();
            avail -= mem::size_of::<T>();
            gained += 1;
        }
        if gained == 0 {
            warn!(
                chunk_size = size,
                node_size = mem::size_of::<T>(),
                "recycled chunk too small to hold a single node"
            );
        }
        gained
    }
}

impl<T: ForwardNode> Default for ForwardList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal self-linking node for list tests.
    #[repr(C)]
    struct TestNode {
        next: Option<NonNull<TestNode>>,
        payload: u64,
    }

    // SAFETY: the link is the first field and is accessed through raw
    // place projections only.
    unsafe impl ForwardNode for TestNode {
        unsafe fn next(node: NonNull<Self>) -> Option<NonNull<Self>> {
            unsafe { (&raw const (*node.as_ptr()).next).read() }
        }

        unsafe fn set_next(node: NonNull<Self>, next: Option<NonNull<Self>>) {
            unsafe { (&raw mut (*node.as_ptr()).next).write(next) };
        }
    }

    fn node(payload: u64) -> NonNull<TestNode> {
        NonNull::from(Box::leak(Box::new(TestNode { next: None, payload })))
    }

    fn free(node: NonNull<TestNode>) {
        // SAFETY: created by `node()` via Box::leak, freed exactly once.
        unsafe { drop(Box::from_raw(node.as_ptr())) };
    }

    #[test]
    fn push_pop_is_lifo() {
        let mut list = ForwardList::<TestNode>::new();
        let (a, b, c) = (node(1), node(2), node(3));
        // SAFETY: fresh, exclusively owned nodes.
        unsafe {
            list.push_front(a);
            list.push_front(b);
            list.push_front(c);
        }
        assert_eq!(list.count(), 3);
        assert_eq!(list.pop_front(), Some(c));
        assert_eq!(list.pop_front(), Some(b));
        assert_eq!(list.pop_front(), Some(a));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
        for n in [a, b, c] {
            free(n);
        }
    }

    #[test]
    fn range_push_splices_in_constant_order() {
        let mut list = ForwardList::<TestNode>::new();
        let bottom = node(0);
        // SAFETY: fresh node.
        unsafe { list.push_front(bottom) };

        // Pre-link a -> b externally, then splice.
        let (a, b) = (node(1), node(2));
        // SAFETY: fresh, exclusively owned chain.
        unsafe {
            TestNode::set_next(a, Some(b));
            list.push_front_range(a, b);
        }
        assert_eq!(list.count(), 3);
        assert_eq!(list.pop_front(), Some(a));
        assert_eq!(list.pop_front(), Some(b));
        assert_eq!(list.pop_front(), Some(bottom));
        for n in [a, b, bottom] {
            free(n);
        }
    }

    #[test]
    fn chunk_slicing_yields_exact_node_count() {
        let node_size = mem::size_of::<TestNode>();
        // u64 backing keeps the chunk start aligned for `TestNode`, so the
        // odd tail bytes are the only remainder.
        let mut backing = vec![0_u64; node_size];
        let chunk = NonNull::new(backing.as_mut_ptr().cast::<u8>()).expect("vec storage");

        let mut list = ForwardList::<TestNode>::new();
        // SAFETY: `backing` is exclusively handed over and outlives the list.
        let gained = unsafe { list.recycle_chunk(chunk, node_size * 5 + 3) };
        assert_eq!(gained, 5);
        assert_eq!(list.count(), 5);

        // Every sliced node is aligned and distinct.
        let mut seen = Vec::new();
        while let Some(n) = list.pop_front() {
            assert_eq!(n.as_ptr() as usize % mem::align_of::<TestNode>(), 0);
            assert!(!seen.contains(&n));
            seen.push(n);
        }
    }

    #[test]
    fn undersized_chunk_yields_nothing() {
        let mut backing = [0_u8; 4];
        let chunk = NonNull::new(backing.as_mut_ptr()).expect("stack storage");
        let mut list = ForwardList::<TestNode>::new();
        // SAFETY: `backing` is exclusively handed over.
        let gained = unsafe { list.recycle_chunk(chunk, backing.len()) };
        assert_eq!(gained, 0);
        assert!(list.is_empty());
    }

    #[test]
    fn clear_forgets_without_touching_storage() {
        let mut list = ForwardList::<TestNode>::new();
        let n = node(42);
        // SAFETY: fresh node.
        unsafe { list.push_front(n) };
        list.clear();
        assert_eq!(list.count(), 0);
        // The node's payload survives the clear untouched.
        // SAFETY: we still own the storage.
        assert_eq!(unsafe { (*n.as_ptr()).payload }, 42);
        free(n);
    }
}
