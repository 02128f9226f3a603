//! Recycling for allocations whose type is only known at run time.
//!
//! Type-erased consumers (wrappers around foreign container code, for
//! instance) request memory through an opaque `(size, align)` interface, so
//! a compile-time recycling strategy cannot be attached to them. The
//! [`RttrAllocator`] closes that gap: it *detects* the node shape from the
//! first allocation it sees and from then on recycles everything matching
//! that shape, falling back to plain allocation for the odd request that
//! does not.

use std::alloc::{Layout, alloc, dealloc};
use std::any::TypeId;
use std::mem;
use std::ptr::NonNull;

use tracing::{debug, warn};

use crate::arena::MonoAllocator;
use crate::error::{MemoryError, Result};
use crate::list::{ForwardList, ForwardNode};
use crate::utils::align_up;

/// Freelist link written into recycled slots.
#[derive(Debug)]
#[repr(C)]
struct RawNode {
    next: Option<NonNull<RawNode>>,
}

// SAFETY: the link is the only field and is accessed through raw place
// projections only.
unsafe impl ForwardNode for RawNode {
    unsafe fn next(node: NonNull<Self>) -> Option<NonNull<Self>> {
        unsafe { (&raw const (*node.as_ptr()).next).read() }
    }

    unsafe fn set_next(node: NonNull<Self>, next: Option<NonNull<Self>>) {
        unsafe { (&raw mut (*node.as_ptr()).next).write(next) };
    }
}

/// The node shape locked in by the first allocation.
///
/// Recycling compatibility is decided by `(size, align)` alone; the type id
/// rides along for diagnostics.
#[derive(Debug, Clone, Copy)]
struct Signature {
    size: usize,
    align: usize,
    #[allow(dead_code)] // diagnostics field, read in log events only
    type_id: TypeId,
}

impl Signature {
    fn matches(&self, size: usize, align: usize) -> bool {
        self.size == size && self.align == align
    }
}

/// Where an [`RttrAllocator`] takes fresh memory from.
#[derive(Debug, Clone, Copy)]
enum Backing<'a> {
    /// An arena the caller keeps alive. Non-recyclable memory is abandoned
    /// in the arena rather than freed.
    Arena(&'a MonoAllocator),
    /// The process heap. Non-recyclable memory is freed immediately.
    Heap,
}

/// A run-time-typed recycling allocator.
///
/// State machine: starts *undetected*; the first [`get`](Self::get) locks in
/// the requested `(size, align)` as the node signature. From then on,
/// requests matching the signature are served from an internal freelist
/// before falling back to the backing allocator, and matching
/// [`recycle`](Self::recycle) calls stock that freelist. Requests with any
/// other shape bypass recycling entirely and raise a one-time `warn!` — they
/// work, they just do not recycle.
///
/// In heap mode, dropping the allocator frees the stocked nodes; in arena
/// mode the arena reclaims them wholesale, but the freelist must not be
/// used across an arena reset (the borrow on the arena enforces this).
#[derive(Debug)]
pub struct RttrAllocator<'a> {
    backing: Backing<'a>,
    stock: ForwardList<RawNode>,
    detected: Option<Signature>,
    // One-shot diagnostics, keyed per condition class.
    warned_get_mismatch: bool,
    warned_recycle_mismatch: bool,
    warned_recycle_undetected: bool,
    warned_chunk_undetected: bool,
    warned_chunk_waste: bool,
}

impl<'a> RttrAllocator<'a> {
    /// Creates an undetected allocator backed by `arena`.
    #[must_use]
    pub fn with_arena(arena: &'a MonoAllocator) -> Self {
        Self::with_backing(Backing::Arena(arena))
    }

    /// Creates an undetected allocator backed by the process heap.
    #[must_use]
    pub fn heap() -> RttrAllocator<'static> {
        RttrAllocator::with_backing(Backing::Heap)
    }

    fn with_backing(backing: Backing<'a>) -> Self {
        Self {
            backing,
            stock: ForwardList::new(),
            detected: None,
            warned_get_mismatch: false,
            warned_recycle_mismatch: false,
            warned_recycle_undetected: false,
            warned_chunk_undetected: false,
            warned_chunk_waste: false,
        }
    }

    /// `true` once the node signature is locked in.
    #[must_use]
    pub fn is_detected(&self) -> bool {
        self.detected.is_some()
    }

    /// The detected `(size, align)` signature, if any.
    #[must_use]
    pub fn detected_shape(&self) -> Option<(usize, usize)> {
        self.detected.map(|sig| (sig.size, sig.align))
    }

    /// Number of stocked recyclable nodes. O(n); diagnostics only.
    #[must_use]
    pub fn count(&self) -> usize {
        self.stock.count()
    }

    /// Allocates `size` bytes aligned to `align` on behalf of `type_id`.
    ///
    /// The first call detects the node signature. Matching calls prefer the
    /// freelist; mismatching calls fall through to the backing allocator
    /// with a one-time `warn!`.
    ///
    /// # Errors
    ///
    /// Propagates backing-allocator failures; see
    /// [`MonoAllocator::alloc_bytes`].
    pub fn get(&mut self, size: usize, align: usize, type_id: TypeId) -> Result<NonNull<u8>> {
        match self.detected {
            None => {
                // The freelist link must fit into, and be placeable in,
                // every recycled slot.
                debug_assert!(
                    align >= mem::align_of::<RawNode>() && size >= mem::size_of::<RawNode>(),
                    "detected node shape too small to carry a freelist link"
                );
                self.detected = Some(Signature { size, align, type_id });
                debug!(size, align, ?type_id, "node signature detected");
                self.fresh(size, align)
            }
            Some(sig) if sig.matches(size, align) => match self.stock.pop_front() {
                Some(node) => Ok(node.cast::<u8>()),
                None => self.fresh(size, align),
            },
            Some(sig) => {
                if !self.warned_get_mismatch {
                    self.warned_get_mismatch = true;
                    warn!(
                        detected_size = sig.size,
                        detected_align = sig.align,
                        size,
                        align,
                        ?type_id,
                        "allocation shape differs from detected node, bypassing recycler"
                    );
                }
                self.fresh(size, align)
            }
        }
    }

    /// Allocates memory that is known to be unrelated to the node type,
    /// straight from the backing allocator. Never touches the freelist and
    /// never warns.
    ///
    /// # Errors
    ///
    /// Propagates backing-allocator failures.
    pub fn alloc_unrelated(&mut self, size: usize, align: usize) -> Result<NonNull<u8>> {
        self.fresh(size, align)
    }

    /// Returns one allocation for reuse.
    ///
    /// Matching the detected signature stocks the freelist. Anything else
    /// cannot be recycled: heap backing frees it, arena backing abandons it
    /// until the arena resets; either way a one-time `warn!` fires.
    ///
    /// # Safety
    ///
    /// `mem` must stem from this allocator (via [`get`](Self::get) or
    /// [`alloc_unrelated`](Self::alloc_unrelated)) with exactly this `size`
    /// and `align`, and must not be used afterwards.
    pub unsafe fn recycle(&mut self, mem: NonNull<u8>, size: usize, align: usize, type_id: TypeId) {
        match self.detected {
            Some(sig) if sig.matches(size, align) => {
                // SAFETY: the slot stems from `get` with the detected
                // signature, so it is big and aligned enough for the link
                // (asserted at detection) and exclusively surrendered.
                unsafe { self.stock.push_front(mem.cast::<RawNode>()) };
            }
            Some(sig) => {
                if !self.warned_recycle_mismatch {
                    self.warned_recycle_mismatch = true;
                    warn!(
                        detected_size = sig.size,
                        detected_align = sig.align,
                        size,
                        align,
                        ?type_id,
                        "recycled object differs from detected node, not reusable"
                    );
                }
                // SAFETY: forwarded caller contract.
                unsafe { self.release(mem, size, align) };
            }
            None => {
                if !self.warned_recycle_undetected {
                    self.warned_recycle_undetected = true;
                    warn!(
                        size,
                        align,
                        ?type_id,
                        "object recycled before any node was detected"
                    );
                }
                // SAFETY: forwarded caller contract.
                unsafe { self.release(mem, size, align) };
            }
        }
    }

    /// Returns a multi-node chunk (a grown-out-of bucket array, say) for
    /// reuse.
    ///
    /// Heap backing frees the chunk outright — the heap cannot split an
    /// allocation. Arena backing slices it into detected-node-sized pieces
    /// and stocks them; if the signature is still undetected the chunk is
    /// abandoned with a one-time `warn!`.
    ///
    /// # Safety
    ///
    /// `mem` must stem from this allocator with exactly this `size` and
    /// `align`, and must not be used afterwards.
    pub unsafe fn recycle_chunk(
        &mut self,
        mem: NonNull<u8>,
        size: usize,
        align: usize,
        type_id: TypeId,
    ) {
        if matches!(self.backing, Backing::Heap) {
            // SAFETY: forwarded caller contract.
            unsafe { self.release(mem, size, align) };
            return;
        }
        let Some(sig) = self.detected else {
            if !self.warned_chunk_undetected {
                self.warned_chunk_undetected = true;
                warn!(
                    size,
                    align,
                    ?type_id,
                    "chunk recycled before any node was detected, abandoning it"
                );
            }
            return;
        };

        // Slice by the *detected* shape, not by `RawNode`: popped slots must
        // be able to hold a whole node object.
        let start = align_up(mem.as_ptr() as usize, sig.align);
        let mut avail = size.saturating_sub(start - mem.as_ptr() as usize);
        let mut at = start;
        let mut gained = 0_usize;
        while avail >= sig.size {
            // SAFETY: `at` lies within the surrendered chunk, aligned for
            // the detected shape, with room for a full node; the link fits
            // per the detection-time assertion.
            unsafe { self.stock.push_front(NonNull::new_unchecked(at as *mut RawNode)) };
            at += sig.size;
            avail -= sig.size;
            gained += 1;
        }
        if gained == 0 && !self.warned_chunk_waste {
            self.warned_chunk_waste = true;
            warn!(
                chunk_size = size,
                node_size = sig.size,
                "recycled chunk too small to hold a single node"
            );
        }
    }

    /// Plain allocation from the backing.
    fn fresh(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        match self.backing {
            Backing::Arena(arena) => arena.alloc_bytes(size, align),
            Backing::Heap => {
                debug_assert!(size != 0, "zero-size heap allocation");
                let layout = Layout::from_size_align(size, align)
                    .map_err(|_| MemoryError::invalid_alignment(align))?;
                // SAFETY: `layout` is valid and non-zero sized.
                let raw = unsafe { alloc(layout) };
                NonNull::new(raw).ok_or_else(|| MemoryError::out_of_memory(size))
            }
        }
    }

    /// Disposes memory that cannot be recycled. Arena backing leaks it into
    /// the arena; heap backing frees it.
    ///
    /// # Safety
    ///
    /// In heap mode, `(mem, size, align)` must describe a live heap
    /// allocation made through [`fresh`](Self::fresh).
    unsafe fn release(&self, mem: NonNull<u8>, size: usize, align: usize) {
        match self.backing {
            Backing::Arena(_) => {
                // Monotonic memory: individual frees do not exist. The next
                // arena reset reclaims the bytes.
            }
            Backing::Heap => {
                // SAFETY: caller contract reproduces the allocation layout.
                unsafe {
                    dealloc(mem.as_ptr(), Layout::from_size_align_unchecked(size, align));
                }
            }
        }
    }
}

impl Drop for RttrAllocator<'_> {
    fn drop(&mut self) {
        if matches!(self.backing, Backing::Arena(_)) {
            return;
        }
        // Heap mode: stocked nodes are individual heap allocations of the
        // detected shape (chunks are never sliced on the heap).
        if let Some(sig) = self.detected {
            while let Some(node) = self.stock.pop_front() {
                // SAFETY: every heap-mode stocked node was allocated in
                // `fresh` with exactly the detected layout.
                unsafe {
                    dealloc(
                        node.as_ptr().cast::<u8>(),
                        Layout::from_size_align_unchecked(sig.size, sig.align),
                    );
                }
            }
        }
    }
}
