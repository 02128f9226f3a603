//! Monotonic arena allocation with intrusive node recycling.
//!
//! The crate pairs two ideas:
//!
//! - **Monotonic allocation** ([`arena`]): memory is bumped out of chained
//!   blocks and never freed individually. Reclamation happens wholesale —
//!   [`MonoAllocator::reset`], a [`Snapshot`] rewind, or drop.
//! - **Recycling** ([`recycler`], [`rttr`]): containers living inside an
//!   arena still erase and re-create nodes between resets. Erased nodes go
//!   onto an intrusive freelist ([`list::ForwardList`]) and are handed out
//!   again before the arena is asked for fresh memory.
//!
//! # Quick start
//!
//! ```
//! use monomem::{ArenaConfig, MonoAllocator};
//!
//! let mut arena = MonoAllocator::new(ArenaConfig::new().with_block_size(4096));
//!
//! // Phase 1: build
//! let name = arena.alloc_slice(b"request-4711")?;
//! assert_eq!(&name[..7], b"request");
//!
//! // Phase 2: rewind, everything above is reclaimed at once.
//! arena.reset();
//! # Ok::<(), monomem::MemoryError>(())
//! ```
//!
//! # Choosing a recycling strategy
//!
//! | Strategy | Stock ownership | Use when |
//! |---|---|---|
//! | [`PrivateRecycler`] | the container itself | the default |
//! | [`SharedRecycler`] | a [`SharedRecyclerPool`] | node-compatible containers should share erased nodes |
//! | [`NoRecycler`] | none | the container only grows between resets |
//! | [`RttrAllocator`] | itself, shape detected at run time | the node type is only known at run time |
//!
//! Everything in this crate is single-threaded by design: one arena, one
//! owner. Cross-thread use is ruled out at compile time (`!Send`/`!Sync`).

#![allow(unsafe_code)]
#![warn(missing_docs)]

pub mod arena;
pub mod error;
pub mod list;
pub mod recycler;
pub mod rttr;
pub mod utils;

pub use arena::{ArenaConfig, ArenaStats, ArenaStatsSnapshot, MonoAllocator, Snapshot};
pub use error::{MemoryError, Result};
pub use list::{ForwardList, ForwardNode};
pub use recycler::{NoRecycler, PrivateRecycler, Recycler, SharedRecycler, SharedRecyclerPool};
pub use rttr::RttrAllocator;

/// Crate version, for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
