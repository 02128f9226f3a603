//! Monotonic arena allocation.
//!
//! The arena hands out memory by bumping a pointer through a chain of
//! blocks. Allocation is a handful of instructions; deallocation does not
//! exist. Memory comes back wholesale, either through
//! [`MonoAllocator::reset`], through a [`Snapshot`] rewind, or when the
//! arena is dropped.
//!
//! This trade is a good fit for phase-structured workloads: build up a
//! request's worth of nodes, strings and buffers, serve it, reset, repeat.
//! Combine the arena with the [`recycler`](crate::recycler) strategies when
//! containers need to erase and re-create individual nodes between resets.

mod allocator;
mod block;
mod config;
mod stats;

pub use allocator::{MonoAllocator, Snapshot};
pub use config::ArenaConfig;
pub use stats::{ArenaStats, ArenaStatsSnapshot};
