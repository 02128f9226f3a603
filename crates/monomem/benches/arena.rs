//! Arena and recycling benchmarks: bump allocation against the global
//! allocator, and node churn with recycling against churn without.

use std::hint::black_box;
use std::ptr::NonNull;

use criterion::{Criterion, criterion_group, criterion_main};
use monomem::{ForwardNode, MonoAllocator, NoRecycler, PrivateRecycler, Recycler};

#[repr(C)]
struct Node {
    next: Option<NonNull<Node>>,
    payload: [u64; 7],
}

// SAFETY: the link is the first field and is accessed through raw place
// projections only.
unsafe impl ForwardNode for Node {
    unsafe fn next(node: NonNull<Self>) -> Option<NonNull<Self>> {
        unsafe { (&raw const (*node.as_ptr()).next).read() }
    }

    unsafe fn set_next(node: NonNull<Self>, next: Option<NonNull<Self>>) {
        unsafe { (&raw mut (*node.as_ptr()).next).write(next) };
    }
}

fn alloc_node<R: Recycler<Node>>(arena: &MonoAllocator, recycler: &mut R) -> NonNull<Node> {
    recycler.get().unwrap_or_else(|| {
        arena
            .alloc_bytes(size_of::<Node>(), align_of::<Node>())
            .expect("arena alloc")
            .cast::<Node>()
    })
}

fn bench_bulk_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_allocation");

    group.bench_function("arena_bump", |b| {
        let mut arena = MonoAllocator::with_block_size(64 * 1024);
        b.iter(|| {
            for i in 0..1000_u64 {
                black_box(arena.alloc(i).expect("alloc"));
            }
            arena.reset();
        });
    });

    group.bench_function("global_box", |b| {
        b.iter(|| {
            for i in 0..1000_u64 {
                black_box(Box::new(i));
            }
        });
    });

    group.finish();
}

fn bench_node_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_churn");

    // Allocate-and-erase cycles: with recycling the arena stops growing
    // after the first round; without it every round consumes fresh memory.
    group.bench_function("recycled", |b| {
        let arena = MonoAllocator::with_block_size(64 * 1024);
        let mut recycler = PrivateRecycler::<Node>::new();
        b.iter(|| {
            for _ in 0..128 {
                let node = alloc_node(&arena, &mut recycler);
                black_box(node);
                // SAFETY: node came from `alloc_node` and is surrendered.
                unsafe { recycler.recycle(node) };
            }
        });
    });

    group.bench_function("unrecycled", |b| {
        let mut arena = MonoAllocator::with_block_size(64 * 1024);
        b.iter(|| {
            let mut recycler = NoRecycler::<Node>::new();
            for _ in 0..128 {
                let node = alloc_node(&arena, &mut recycler);
                black_box(node);
                // SAFETY: node is surrendered (and ignored by the strategy).
                unsafe { recycler.recycle(node) };
            }
            arena.reset();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_bulk_allocation, bench_node_churn);
criterion_main!(benches);
