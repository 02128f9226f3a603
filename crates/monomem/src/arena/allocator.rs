//! Monotonic bump allocator over a chain of [`Block`]s.

use std::cell::Cell;
use std::mem;
use std::ptr::{self, NonNull};

use super::block::Block;
use super::config::ArenaConfig;
use super::stats::ArenaStats;
use crate::error::{MemoryError, Result};

/// Marker of an arena fill state, taken with
/// [`MonoAllocator::take_snapshot`] and applied with
/// [`MonoAllocator::reset_to`].
///
/// A default-constructed snapshot resets the whole arena, equivalent to
/// [`MonoAllocator::reset`].
///
/// Snapshots must only be applied to the arena they were taken from, and
/// become invalid once any reset rewinds the arena past their position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    block: *mut Block,
    fill: *mut u8,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self { block: ptr::null_mut(), fill: ptr::null_mut() }
    }
}

/// A monotonic ("bump") allocator.
///
/// Memory is carved out of a chain of blocks in strictly increasing address
/// order within each block. Individual allocations are never freed; the only
/// reclamation operations are [`reset`](Self::reset) and
/// [`reset_to`](Self::reset_to), which rewind the whole arena while keeping
/// its blocks for reuse.
///
/// The allocator is a single-owner type. Allocation takes `&self` through
/// interior mutability so references into the arena can coexist with further
/// allocations; both reset operations take `&mut self`, which statically
/// rules out live references into memory about to be rewound. The type is
/// neither `Send` nor `Sync`.
///
/// # Example
///
/// ```
/// use monomem::MonoAllocator;
///
/// let arena = MonoAllocator::with_block_size(1024);
/// let value = arena.alloc(42_u64)?;
/// assert_eq!(*value, 42);
/// # Ok::<(), monomem::MemoryError>(())
/// ```
#[derive(Debug)]
pub struct MonoAllocator {
    /// Head of the block chain, in creation order. Null until first use.
    first: Cell<*mut Block>,
    /// Block currently served from. Only moves forward between resets.
    current: Cell<*mut Block>,
    /// Payload size for the next regular block, advanced by the growth
    /// factor and clamped to `config.max_block_size`.
    next_block_size: Cell<usize>,
    config: ArenaConfig,
    stats: ArenaStats,
}

impl MonoAllocator {
    /// Creates an arena with the given configuration.
    ///
    /// No memory is reserved until the first allocation request.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            first: Cell::new(ptr::null_mut()),
            current: Cell::new(ptr::null_mut()),
            next_block_size: Cell::new(config.block_size),
            config,
            stats: ArenaStats::new(),
        }
    }

    /// Creates an arena with the given standard block size and default
    /// settings otherwise.
    #[must_use]
    pub fn with_block_size(bytes: usize) -> Self {
        Self::new(ArenaConfig::new().with_block_size(bytes))
    }

    /// The configuration this arena was built with.
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocation statistics. All counters stay zero unless
    /// [`ArenaConfig::track_stats`] is set.
    #[must_use]
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// Allocates `size` bytes aligned to `align`.
    ///
    /// Serves from the current block when possible; otherwise rolls forward
    /// along the chain, reusing blocks a snapshot reset left behind, and
    /// creates a new block at the tail as a last resort. A request larger
    /// than the standard block size gets a dedicated block of its own.
    ///
    /// # Errors
    ///
    /// [`MemoryError::InvalidSize`] for `size == 0` (also a `debug_assert!`),
    /// [`MemoryError::InvalidAlignment`] for non-power-of-two alignments,
    /// and [`MemoryError::OutOfMemory`] when the system allocator fails.
    pub fn alloc_bytes(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        if !align.is_power_of_two() {
            return Err(MemoryError::invalid_alignment(align));
        }
        debug_assert!(size != 0, "zero-size arena allocation");
        if size == 0 {
            return Err(MemoryError::invalid_size(0, "zero-size allocation"));
        }

        loop {
            let cur = self.current.get();
            if cur.is_null() {
                self.grow(size, align)?;
                continue;
            }
            // SAFETY: `cur` points to a live block owned by this arena, and
            // no reference to the block itself escapes this scope. Handed-out
            // allocations only ever alias payload bytes behind `act`.
            let block = unsafe { &mut *cur };
            let before = block.remaining();
            if let Some(ptr) = block.alloc(size, align) {
                if self.config.track_stats {
                    let padding = before - block.remaining() - size;
                    self.stats.record_allocation(size, padding);
                }
                return Ok(ptr);
            }

            // The current block is done. Whatever is left in it stays
            // unused until the next reset.
            if self.config.track_stats {
                self.stats.record_block_waste(block.remaining());
            }
            if block.next.is_null() {
                self.grow(size, align)?;
            } else {
                self.current.set(block.next);
            }
        }
    }

    /// Moves `value` into the arena and returns a reference to it.
    ///
    /// The value's destructor never runs; arena memory is reclaimed
    /// wholesale by resets or by dropping the arena.
    pub fn alloc<T>(&self, value: T) -> Result<&mut T> {
        // Zero-sized types still receive a unique, aligned address.
        let size = mem::size_of::<T>().max(1);
        let ptr = self.alloc_bytes(size, mem::align_of::<T>())?;
        let typed = ptr.as_ptr().cast::<T>();
        // SAFETY: the allocation is fresh, exclusive, and sized and aligned
        // for `T`.
        unsafe {
            typed.write(value);
            Ok(&mut *typed)
        }
    }

    /// Copies `values` into the arena and returns the arena-backed slice.
    pub fn alloc_slice<T: Copy>(&self, values: &[T]) -> Result<&mut [T]> {
        if values.is_empty() {
            return Ok(&mut []);
        }
        let ptr = self.alloc_bytes(mem::size_of_val(values), mem::align_of::<T>())?;
        let typed = ptr.as_ptr().cast::<T>();
        // SAFETY: the allocation is fresh, exclusive, and sized and aligned
        // for `values.len()` elements of `T`; the source cannot overlap it.
        unsafe {
            ptr::copy_nonoverlapping(values.as_ptr(), typed, values.len());
            Ok(std::slice::from_raw_parts_mut(typed, values.len()))
        }
    }

    /// Captures the current fill state.
    #[must_use]
    pub fn take_snapshot(&self) -> Snapshot {
        let cur = self.current.get();
        if cur.is_null() {
            return Snapshot::default();
        }
        // SAFETY: the current block is live.
        let fill = unsafe { (*cur).fill() };
        Snapshot { block: cur, fill }
    }

    /// Rewinds the arena to a previously taken [`Snapshot`].
    ///
    /// Blocks behind the snapshot position become empty again but stay
    /// allocated; subsequent allocations reuse them before any new block is
    /// created. Takes `&mut self`: the borrow checker guarantees no
    /// references into the rewound region survive this call.
    ///
    /// # Errors
    ///
    /// [`MemoryError::InvalidSnapshot`] if the snapshot was not taken from
    /// this arena.
    pub fn reset_to(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.block.is_null() {
            self.reset();
            return Ok(());
        }

        let mut it = self.first.get();
        let mut found = false;
        while !it.is_null() {
            // SAFETY: chain blocks are live and exclusively owned; `&mut
            // self` excludes outstanding references into their payloads.
            let block = unsafe { &mut *it };
            if found {
                block.reset();
                if self.config.zero_memory {
                    block.zero_payload();
                }
            } else if it == snapshot.block {
                found = true;
                // SAFETY: the fill pointer was captured from this very
                // block while it was live.
                unsafe { block.restore_fill(snapshot.fill) };
            }
            it = block.next;
        }
        if !found {
            return Err(MemoryError::invalid_snapshot("snapshot does not belong to this arena"));
        }

        self.current.set(snapshot.block);
        if self.config.track_stats {
            self.stats.record_reset();
        }
        Ok(())
    }

    /// Rewinds the whole arena. All blocks stay allocated and empty;
    /// previously handed-out memory is reclaimed in one sweep.
    pub fn reset(&mut self) {
        let mut it = self.first.get();
        while !it.is_null() {
            // SAFETY: chain blocks are live; `&mut self` excludes
            // outstanding references into their payloads.
            let block = unsafe { &mut *it };
            block.reset();
            if self.config.zero_memory {
                block.zero_payload();
            }
            it = block.next;
        }
        self.current.set(self.first.get());
        if self.config.track_stats {
            self.stats.record_reset();
        }
    }

    /// Creates a block at the tail of the chain and makes it current.
    ///
    /// Regular blocks follow the configured growth sequence. A request that
    /// does not fit a standard block gets a dedicated block sized for it,
    /// which does not advance the growth sequence.
    fn grow(&self, size: usize, align: usize) -> Result<()> {
        let standard = self.next_block_size.get();
        // Worst-case padding for the request's alignment is reserved up
        // front so the first bump in the new block cannot fail.
        let needed = size
            .checked_add(align)
            .ok_or_else(|| MemoryError::invalid_size(size, "request size overflows"))?;
        let usable = needed.max(standard);

        let block = Block::create(usable)?;
        let raw = block.as_ptr();
        if self.config.zero_memory {
            // SAFETY: freshly created block, not yet linked anywhere.
            unsafe { (*raw).zero_payload() };
        }

        if usable > standard {
            if self.config.track_stats {
                self.stats.record_oversize();
            }
        } else {
            let next = (standard as f64 * self.config.growth_factor) as usize;
            let ceiling = self.config.max_block_size.max(self.config.block_size);
            self.next_block_size.set(next.clamp(self.config.block_size, ceiling));
        }
        if self.config.track_stats {
            self.stats.record_block(usable);
        }

        let cur = self.current.get();
        if cur.is_null() {
            debug_assert!(self.first.get().is_null());
            self.first.set(raw);
        } else {
            // `grow` is only reached once the walk stands at the tail.
            // SAFETY: `cur` is a live block owned by this arena.
            unsafe {
                debug_assert!((*cur).next.is_null());
                (*cur).next = raw;
            }
        }
        self.current.set(raw);
        Ok(())
    }
}

impl Default for MonoAllocator {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

impl Drop for MonoAllocator {
    fn drop(&mut self) {
        let mut it = self.first.get();
        while !it.is_null() {
            // SAFETY: every chain block was produced by `Block::create` and
            // is destroyed exactly once; `next` is read before the header
            // memory is returned.
            unsafe {
                let next = (*it).next;
                Block::destroy(NonNull::new_unchecked(it));
                it = next;
            }
        }
    }
}
