//! Configuration for [`MonoAllocator`](super::MonoAllocator).

use crate::error::{MemoryError, Result};

/// Tuning knobs for an arena.
///
/// Built fluently:
///
/// ```
/// use monomem::ArenaConfig;
///
/// let config = ArenaConfig::new()
///     .with_block_size(8 * 1024)
///     .with_growth_factor(1.5)
///     .with_stats(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaConfig {
    /// Payload size of the first regular block, in bytes.
    pub block_size: usize,
    /// Multiplier applied to the block size for each further regular block.
    /// `1.0` keeps all blocks the same size.
    pub growth_factor: f64,
    /// Upper bound for regular block sizes. Oversized requests may still
    /// exceed it with a dedicated block.
    pub max_block_size: usize,
    /// Whether to record [`ArenaStats`](super::ArenaStats) counters.
    pub track_stats: bool,
    /// Zero block payloads on creation and reset. Debug aid; makes
    /// use-after-reset bugs deterministic.
    pub zero_memory: bool,
}

impl ArenaConfig {
    /// Default configuration: 4 KiB blocks doubling up to 16 MiB, stats in
    /// debug builds only, no zeroing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            block_size: 4 * 1024,
            growth_factor: 2.0,
            max_block_size: 16 * 1024 * 1024,
            track_stats: cfg!(debug_assertions),
            zero_memory: false,
        }
    }

    /// Configuration for debugging: small fixed-size blocks, stats on,
    /// payload zeroing on.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            block_size: 1024,
            growth_factor: 1.0,
            max_block_size: 1024,
            track_stats: true,
            zero_memory: true,
        }
    }

    /// Configuration for release use: larger blocks, no bookkeeping.
    #[must_use]
    pub fn production() -> Self {
        Self {
            block_size: 64 * 1024,
            growth_factor: 2.0,
            max_block_size: 16 * 1024 * 1024,
            track_stats: false,
            zero_memory: false,
        }
    }

    /// Sets the standard block size.
    #[must_use]
    pub fn with_block_size(mut self, bytes: usize) -> Self {
        self.block_size = bytes;
        self
    }

    /// Sets the growth factor for consecutive regular blocks.
    #[must_use]
    pub fn with_growth_factor(mut self, factor: f64) -> Self {
        self.growth_factor = factor;
        self
    }

    /// Sets the upper bound for regular block sizes.
    #[must_use]
    pub fn with_max_block_size(mut self, bytes: usize) -> Self {
        self.max_block_size = bytes;
        self
    }

    /// Enables or disables statistics recording.
    #[must_use]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }

    /// Enables or disables payload zeroing.
    #[must_use]
    pub fn with_zeroing(mut self, enabled: bool) -> Self {
        self.zero_memory = enabled;
        self
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// [`MemoryError::InvalidConfig`] on a zero block size, a growth factor
    /// below `1.0`, or a maximum below the standard block size.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(MemoryError::invalid_config("block_size must be non-zero"));
        }
        if self.growth_factor < 1.0 {
            return Err(MemoryError::invalid_config("growth_factor must be at least 1.0"));
        }
        if self.max_block_size < self.block_size {
            return Err(MemoryError::invalid_config("max_block_size below block_size"));
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
