//! Allocator configuration parameters.

use crate::error::ArenaError;

/// Configuration for [`PagedBump`](crate::PagedBump).
///
/// Every page the allocator maps is `pages_per_block` OS pages long, so a
/// single allocation can be at most that large.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BumpConfig {
    /// Number of OS pages mapped per bump page.
    ///
    /// Default: 32 (128KB with 4KB OS pages). Must be at least 1.
    pub pages_per_block: usize,
}

impl BumpConfig {
    /// Default number of OS pages per bump page.
    pub const DEFAULT_PAGES_PER_BLOCK: usize = 32;

    /// Create a config with the given block size in OS pages.
    pub fn new(pages_per_block: usize) -> Self {
        Self { pages_per_block }
    }

    /// Size of one bump page in bytes for the given OS page size.
    pub fn block_bytes(&self, os_page_size: usize) -> Result<usize, ArenaError> {
        if self.pages_per_block == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "pages_per_block must be at least 1",
            });
        }
        os_page_size
            .checked_mul(self.pages_per_block)
            .ok_or(ArenaError::InvalidConfig {
                reason: "pages_per_block overflows the address space",
            })
    }
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGES_PER_BLOCK)
    }
}

/// Configuration for [`SlotTracker`](crate::SlotTracker) and
/// [`Arena`](crate::Arena).
///
/// The free bitmap and generation table are mapped once, sized for
/// `max_elements`, so the arena never copies bookkeeping as it grows.
/// Untouched pages of those mappings cost address space only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Hard upper bound on the number of slots.
    ///
    /// Default: 65_536. Must be at least 1.
    pub max_elements: u32,
}

impl ArenaConfig {
    /// Default slot limit.
    pub const DEFAULT_MAX_ELEMENTS: u32 = 1 << 16;

    /// Create a config with the given slot limit.
    pub fn new(max_elements: u32) -> Self {
        Self { max_elements }
    }

    /// Reject configurations that cannot back an arena.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.max_elements == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_elements must be at least 1",
            });
        }
        Ok(())
    }

    /// Number of 64-bit words in the free bitmap.
    pub fn bitmap_words(&self) -> usize {
        (self.max_elements as usize).div_ceil(64)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ELEMENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_block_is_32_pages() {
        let config = BumpConfig::default();
        assert_eq!(config.block_bytes(4096).unwrap(), 128 * 1024);
    }

    #[test]
    fn zero_pages_per_block_is_rejected() {
        let config = BumpConfig::new(0);
        assert!(matches!(
            config.block_bytes(4096),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn bitmap_words_round_up() {
        assert_eq!(ArenaConfig::new(1).bitmap_words(), 1);
        assert_eq!(ArenaConfig::new(64).bitmap_words(), 1);
        assert_eq!(ArenaConfig::new(65).bitmap_words(), 2);
        assert_eq!(ArenaConfig::default().bitmap_words(), 1024);
    }

    #[test]
    fn zero_max_elements_is_rejected() {
        assert!(ArenaConfig::new(0).validate().is_err());
        assert!(ArenaConfig::default().validate().is_ok());
    }
}
