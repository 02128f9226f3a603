//! Integration tests driving the recycling strategies the way an
//! arena-backed container would: erase nodes, get them back, reset.

use std::ptr::NonNull;

use monomem::{
    ForwardNode, MonoAllocator, NoRecycler, PrivateRecycler, Recycler, SharedRecycler,
    SharedRecyclerPool,
};
use pretty_assertions::assert_eq;

/// A list-container node as a container built on this crate would define
/// it: link first, payload behind.
#[repr(C)]
struct Entry {
    next: Option<NonNull<Entry>>,
    key: u32,
    value: [u8; 20],
}

// SAFETY: the link is the first field and is accessed through raw place
// projections only.
unsafe impl ForwardNode for Entry {
    unsafe fn next(node: NonNull<Self>) -> Option<NonNull<Self>> {
        unsafe { (&raw const (*node.as_ptr()).next).read() }
    }

    unsafe fn set_next(node: NonNull<Self>, next: Option<NonNull<Self>>) {
        unsafe { (&raw mut (*node.as_ptr()).next).write(next) };
    }
}

/// What a container's insert path does: recycled node first, arena second.
fn new_entry<R: Recycler<Entry>>(
    arena: &MonoAllocator,
    recycler: &mut R,
    key: u32,
) -> NonNull<Entry> {
    let slot = recycler.get().unwrap_or_else(|| {
        arena
            .alloc_bytes(size_of::<Entry>(), align_of::<Entry>())
            .expect("arena alloc")
            .cast::<Entry>()
    });
    // SAFETY: `slot` is dead storage sized and aligned for `Entry`.
    unsafe {
        slot.as_ptr().write(Entry { next: None, key, value: [0; 20] });
    }
    slot
}

#[test]
fn erased_nodes_are_reused_lifo() {
    let arena = MonoAllocator::with_block_size(1024);
    let mut recycler = PrivateRecycler::<Entry>::new();

    let a = new_entry(&arena, &mut recycler, 1);
    let b = new_entry(&arena, &mut recycler, 2);
    // SAFETY: both nodes are exclusively owned and surrendered here.
    unsafe {
        recycler.recycle(a);
        recycler.recycle(b);
    }
    assert_eq!(recycler.count(), 2);

    // LIFO: b comes back first, then a; only then does the arena grow.
    assert_eq!(new_entry(&arena, &mut recycler, 3), b);
    assert_eq!(new_entry(&arena, &mut recycler, 4), a);
    assert_eq!(recycler.count(), 0);
}

#[test]
fn private_recyclers_do_not_leak_into_each_other() {
    let arena = MonoAllocator::with_block_size(1024);
    let mut left = PrivateRecycler::<Entry>::new();
    let mut right = PrivateRecycler::<Entry>::new();

    let node = new_entry(&arena, &mut left, 1);
    // SAFETY: exclusively owned node.
    unsafe { left.recycle(node) };

    assert!(right.get().is_none());
    assert_eq!(left.count(), 1);
}

#[test]
fn shared_pool_moves_nodes_across_containers() {
    let arena = MonoAllocator::with_block_size(1024);
    let pool = SharedRecyclerPool::<Entry>::new();
    let mut list_a = SharedRecycler::new(&pool);
    let mut list_b = SharedRecycler::new(&pool);

    // Container A erases three nodes.
    let nodes: Vec<_> = (0..3).map(|k| new_entry(&arena, &mut list_a, k)).collect();
    for &node in &nodes {
        // SAFETY: exclusively owned nodes.
        unsafe { list_a.recycle(node) };
    }
    assert_eq!(pool.count(), 3);

    // Container B reuses them without touching the arena.
    let blocks_before = arena.stats().blocks_created();
    for k in 10..13 {
        let reused = new_entry(&arena, &mut list_b, k);
        assert!(nodes.contains(&reused));
    }
    assert_eq!(pool.count(), 0);
    assert_eq!(arena.stats().blocks_created(), blocks_before);
}

#[test]
fn dispose_before_reset_keeps_strategies_consistent() {
    let mut arena = MonoAllocator::with_block_size(1024);
    let mut private = PrivateRecycler::<Entry>::new();

    let node = new_entry(&arena, &mut private, 1);
    // SAFETY: exclusively owned node.
    unsafe { private.recycle(node) };

    // The contract before an arena reset: drop privately stocked nodes,
    // because their storage is about to be rewound.
    private.dispose_if_private();
    assert_eq!(private.count(), 0);
    arena.reset();

    // Disposal is idempotent and cheap to call again.
    private.dispose_if_private();
    assert_eq!(private.count(), 0);
}

#[test]
fn disabled_strategy_always_grows_the_arena() {
    let arena = MonoAllocator::with_block_size(4096);
    let mut recycler = NoRecycler::<Entry>::new();

    let a = new_entry(&arena, &mut recycler, 1);
    // SAFETY: exclusively owned node; the disabled strategy ignores it.
    unsafe { recycler.recycle(a) };
    assert_eq!(recycler.count(), 0);

    // The "recycled" node is not handed out again.
    let b = new_entry(&arena, &mut recycler, 2);
    assert_ne!(a, b);
}

#[test]
fn chunk_recycling_feeds_node_growth() {
    let arena = MonoAllocator::with_block_size(4096);
    let mut recycler = PrivateRecycler::<Entry>::new();

    // A container outgrew its bucket array: the old one becomes nodes.
    let chunk_size = size_of::<Entry>() * 6 + 5;
    let chunk = arena.alloc_bytes(chunk_size, align_of::<Entry>()).expect("bucket array");
    // SAFETY: chunk memory is exclusively surrendered and arena-backed.
    let gained = unsafe { recycler.recycle_chunk(chunk, chunk_size) };
    assert_eq!(gained, 6);

    let blocks_before = arena.stats().blocks_created();
    for k in 0..6 {
        new_entry(&arena, &mut recycler, k);
    }
    assert_eq!(recycler.count(), 0);
    assert_eq!(arena.stats().blocks_created(), blocks_before);
}
