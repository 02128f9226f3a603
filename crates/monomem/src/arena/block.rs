//! The memory block underlying [`MonoAllocator`](super::MonoAllocator).
//!
//! A block is one raw allocation from the system allocator. Its header lives
//! at the *start* of that allocation and the usable payload follows directly
//! behind it, so block bookkeeping costs no separate heap object.

use std::alloc::{Layout, alloc, dealloc};
use std::mem;
use std::ptr::{self, NonNull};

use crate::error::MemoryError;
use crate::utils::align_up;

/// Header of one arena block.
///
/// Layout (one contiguous system allocation):
///
/// ```text
/// +--------+----------------------------------+
/// | Block  |             payload              |
/// +--------+----------------------------------+
/// ^        ^ act grows this way ->            ^
/// self     payload_start()                    end
/// ```
///
/// `act` is the bump pointer: it starts at the payload and only moves
/// forward until [`reset`](Block::reset) rewinds it.
#[repr(C)]
pub(crate) struct Block {
    /// Next block in the chain, in creation order. Null at the tail.
    pub(crate) next: *mut Block,
    /// First free payload byte.
    act: *mut u8,
    /// One past the last byte of the whole allocation.
    end: *mut u8,
}

impl Block {
    /// Allocates a block whose payload holds at least `usable` bytes.
    ///
    /// The allocation is aligned to `align_of::<Block>()`; larger alignment
    /// requests are satisfied by [`alloc`](Block::alloc) bumping past
    /// padding, with the caller sizing the block to leave room for it.
    pub(crate) fn create(usable: usize) -> Result<NonNull<Block>, MemoryError> {
        let size = mem::size_of::<Block>()
            .checked_add(usable)
            .ok_or_else(|| MemoryError::invalid_size(usable, "block size overflows"))?;
        let layout = Layout::from_size_align(size, mem::align_of::<Block>())
            .map_err(|_| MemoryError::invalid_size(size, "block layout rejected"))?;

        // SAFETY: `layout` has non-zero size (the header alone is non-zero).
        let raw = unsafe { alloc(layout) };
        let Some(header) = NonNull::new(raw.cast::<Block>()) else {
            return Err(MemoryError::out_of_memory(size));
        };

        // SAFETY: `raw` points to `size` freshly allocated bytes, aligned
        // for `Block`, and nothing else references them yet.
        unsafe {
            header.as_ptr().write(Block {
                next: ptr::null_mut(),
                act: raw.add(mem::size_of::<Block>()),
                end: raw.add(size),
            });
        }
        Ok(header)
    }

    /// Returns the backing allocation to the system allocator.
    ///
    /// # Safety
    ///
    /// `block` must have been produced by [`Block::create`] and must not be
    /// used in any way afterwards. Pointers into its payload become dangling.
    pub(crate) unsafe fn destroy(block: NonNull<Block>) {
        let base = block.as_ptr().cast::<u8>();
        // SAFETY: `end` and `base` delimit the single allocation this block
        // was created with, so the layout below reproduces the original one.
        unsafe {
            let size = (*block.as_ptr()).end.offset_from(base) as usize;
            dealloc(base, Layout::from_size_align_unchecked(size, mem::align_of::<Block>()));
        }
    }

    /// First payload byte, directly behind the header.
    #[inline]
    fn payload_start(&self) -> *mut u8 {
        // SAFETY: the payload begins within the same allocation, right
        // behind the header (see `create`).
        unsafe { (self as *const Block as *mut u8).add(mem::size_of::<Block>()) }
    }

    /// Total payload capacity in bytes.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.end as usize - self.payload_start() as usize
    }

    /// Unconsumed payload bytes.
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.end as usize - self.act as usize
    }

    /// Current fill pointer, captured by snapshots.
    #[inline]
    pub(crate) fn fill(&self) -> *mut u8 {
        self.act
    }

    /// Restores a fill pointer previously captured with [`fill`](Block::fill).
    ///
    /// # Safety
    ///
    /// `fill` must lie within this block's payload range.
    pub(crate) unsafe fn restore_fill(&mut self, fill: *mut u8) {
        debug_assert!(
            fill as usize >= self.payload_start() as usize && fill as usize <= self.end as usize,
            "fill pointer outside block payload"
        );
        self.act = fill;
    }

    /// Bump-allocates `size` bytes aligned to `align` from this block.
    ///
    /// Returns `None` when the aligned request does not fit. That is the
    /// normal roll-forward signal, not an error.
    #[inline]
    pub(crate) fn alloc(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let aligned = align_up(self.act as usize, align);
        let new_act = aligned.checked_add(size)?;
        if new_act > self.end as usize {
            return None;
        }
        self.act = new_act as *mut u8;
        // The aligned address is non-null: it lies inside a live allocation.
        NonNull::new(aligned as *mut u8)
    }

    /// Rewinds the bump pointer to the payload start. Contents are left
    /// as-is; callers opt into zeroing separately.
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.act = self.payload_start();
    }

    /// Overwrites the entire payload with zero bytes.
    pub(crate) fn zero_payload(&mut self) {
        // SAFETY: `payload_start..end` is owned, writable payload memory.
        unsafe {
            ptr::write_bytes(self.payload_start(), 0, self.capacity());
        }
    }
}
