//! Allocation statistics for [`MonoAllocator`](super::MonoAllocator).
//!
//! Counters are atomics so the allocator can record through `&self` from its
//! interior-mutable allocation path. The allocator itself is single-owner;
//! `Relaxed` ordering is sufficient.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Live counters attached to an arena.
///
/// Recording is gated on [`ArenaConfig::track_stats`](super::ArenaConfig);
/// with tracking disabled all counters stay zero.
#[derive(Debug, Default)]
pub struct ArenaStats {
    /// Number of served allocation requests.
    allocations: AtomicU64,
    /// Sum of requested sizes, without padding.
    bytes_requested: AtomicUsize,
    /// Sum of block payload capacities reserved from the system allocator.
    bytes_reserved: AtomicUsize,
    /// Padding bytes consumed to satisfy alignment requests.
    alignment_waste: AtomicUsize,
    /// Bytes abandoned at the tail of exhausted blocks.
    block_waste: AtomicUsize,
    /// Number of blocks created.
    blocks_created: AtomicUsize,
    /// Requests larger than the standard block size, each served by a
    /// dedicated block.
    oversize_requests: AtomicU64,
    /// Number of full or snapshot resets.
    resets: AtomicU64,
}

impl ArenaStats {
    /// Creates a zeroed statistics record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_allocation(&self, requested: usize, padding: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_requested.fetch_add(requested, Ordering::Relaxed);
        if padding > 0 {
            self.alignment_waste.fetch_add(padding, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_block(&self, capacity: usize) {
        self.blocks_created.fetch_add(1, Ordering::Relaxed);
        self.bytes_reserved.fetch_add(capacity, Ordering::Relaxed);
    }

    pub(crate) fn record_block_waste(&self, unused: usize) {
        self.block_waste.fetch_add(unused, Ordering::Relaxed);
    }

    pub(crate) fn record_oversize(&self) {
        self.oversize_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of served allocation requests.
    #[must_use]
    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Sum of requested bytes, excluding alignment padding.
    #[must_use]
    pub fn bytes_requested(&self) -> usize {
        self.bytes_requested.load(Ordering::Relaxed)
    }

    /// Total payload capacity reserved from the system allocator.
    #[must_use]
    pub fn bytes_reserved(&self) -> usize {
        self.bytes_reserved.load(Ordering::Relaxed)
    }

    /// Padding bytes spent on alignment.
    #[must_use]
    pub fn alignment_waste(&self) -> usize {
        self.alignment_waste.load(Ordering::Relaxed)
    }

    /// Bytes abandoned at the tail of exhausted blocks.
    #[must_use]
    pub fn block_waste(&self) -> usize {
        self.block_waste.load(Ordering::Relaxed)
    }

    /// Number of blocks created since construction. Resets do not release
    /// blocks, so this never decreases.
    #[must_use]
    pub fn blocks_created(&self) -> usize {
        self.blocks_created.load(Ordering::Relaxed)
    }

    /// Requests served by a dedicated oversized block.
    #[must_use]
    pub fn oversize_requests(&self) -> u64 {
        self.oversize_requests.load(Ordering::Relaxed)
    }

    /// Number of resets, full and snapshot-based.
    #[must_use]
    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }

    /// Fraction of reserved capacity occupied by requested bytes.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        let reserved = self.bytes_reserved();
        if reserved == 0 {
            return 0.0;
        }
        self.bytes_requested() as f64 / reserved as f64
    }

    /// Captures a point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> ArenaStatsSnapshot {
        ArenaStatsSnapshot {
            allocations: self.allocations(),
            bytes_requested: self.bytes_requested(),
            bytes_reserved: self.bytes_reserved(),
            alignment_waste: self.alignment_waste(),
            block_waste: self.block_waste(),
            blocks_created: self.blocks_created(),
            oversize_requests: self.oversize_requests(),
            resets: self.resets(),
        }
    }
}

/// Point-in-time copy of [`ArenaStats`], cheap to pass around and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStatsSnapshot {
    /// Number of served allocation requests.
    pub allocations: u64,
    /// Sum of requested sizes, without padding.
    pub bytes_requested: usize,
    /// Sum of block payload capacities.
    pub bytes_reserved: usize,
    /// Padding bytes consumed by alignment.
    pub alignment_waste: usize,
    /// Bytes abandoned at the tail of exhausted blocks.
    pub block_waste: usize,
    /// Number of blocks created.
    pub blocks_created: usize,
    /// Requests served by a dedicated oversized block.
    pub oversize_requests: u64,
    /// Number of resets.
    pub resets: u64,
}

impl fmt::Display for ArenaStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arena statistics:")?;
        writeln!(f, "  allocations:      {}", self.allocations)?;
        writeln!(f, "  bytes requested:  {}", self.bytes_requested)?;
        writeln!(f, "  bytes reserved:   {}", self.bytes_reserved)?;
        writeln!(f, "  alignment waste:  {}", self.alignment_waste)?;
        writeln!(f, "  block waste:      {}", self.block_waste)?;
        writeln!(f, "  blocks created:   {}", self.blocks_created)?;
        writeln!(f, "  oversize requests:{}", self.oversize_requests)?;
        write!(f, "  resets:           {}", self.resets)
    }
}
