//! Error types for monotonic allocation operations.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Errors raised by arena and recycling allocators.
///
/// Exhaustion of the *current* block is not an error — the allocator rolls
/// forward to the next block transparently. Only failure of the backing
/// system allocator, or malformed requests, surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The backing system allocator could not produce a new block.
    #[error("out of memory: failed to reserve {requested} bytes")]
    OutOfMemory {
        /// Size of the failed reservation in bytes.
        requested: usize,
    },

    /// A requested alignment was not a power of two.
    #[error("invalid alignment {align}: must be a power of two")]
    InvalidAlignment {
        /// The rejected alignment value.
        align: usize,
    },

    /// A zero-sized or otherwise malformed allocation request.
    #[error("invalid size {size}: {reason}")]
    InvalidSize {
        /// The rejected size in bytes.
        size: usize,
        /// Why the size was rejected.
        reason: String,
    },

    /// A snapshot was applied to an arena it was not taken from, or its
    /// recorded state no longer exists.
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot {
        /// Why the snapshot was rejected.
        reason: String,
    },

    /// An [`ArenaConfig`](crate::arena::ArenaConfig) failed validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        message: String,
    },
}

impl MemoryError {
    /// Creates a [`MemoryError::OutOfMemory`] error.
    #[must_use]
    pub fn out_of_memory(requested: usize) -> Self {
        Self::OutOfMemory { requested }
    }

    /// Creates a [`MemoryError::InvalidAlignment`] error.
    #[must_use]
    pub fn invalid_alignment(align: usize) -> Self {
        Self::InvalidAlignment { align }
    }

    /// Creates a [`MemoryError::InvalidSize`] error.
    #[must_use]
    pub fn invalid_size(size: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSize { size, reason: reason.into() }
    }

    /// Creates a [`MemoryError::InvalidSnapshot`] error.
    #[must_use]
    pub fn invalid_snapshot(reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot { reason: reason.into() }
    }

    /// Creates a [`MemoryError::InvalidConfig`] error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }

    /// Returns `true` if this error signals exhaustion of the backing
    /// system allocator rather than a malformed request.
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_carry_context() {
        let err = MemoryError::out_of_memory(4096);
        assert_eq!(err.to_string(), "out of memory: failed to reserve 4096 bytes");

        let err = MemoryError::invalid_alignment(3);
        assert_eq!(err.to_string(), "invalid alignment 3: must be a power of two");

        let err = MemoryError::invalid_size(0, "zero-size allocation");
        assert_eq!(err.to_string(), "invalid size 0: zero-size allocation");
    }

    #[test]
    fn out_of_memory_predicate() {
        assert!(MemoryError::out_of_memory(1).is_out_of_memory());
        assert!(!MemoryError::invalid_alignment(3).is_out_of_memory());
    }
}
