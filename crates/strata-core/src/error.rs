//! Error types for virtual-memory acquisition and release.

use std::error::Error;
use std::fmt;

/// Failures reported by a [`VirtualMemory`](crate::VirtualMemory) source.
///
/// These are the only errors in the workspace caused by something outside
/// the program: the operating system refusing to map or unmap memory.
/// Nothing retries them; callers decide whether to try again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryError {
    /// The source could not map a new region.
    MapFailed {
        /// Number of bytes requested.
        size: usize,
        /// OS error code (`errno`), or 0 if unknown.
        errno: i32,
    },
    /// The source could not unmap a region.
    UnmapFailed {
        /// Length of the region in bytes.
        size: usize,
        /// OS error code (`errno`), or 0 if unknown.
        errno: i32,
    },
    /// A zero-length or overflowing size was requested.
    InvalidSize {
        /// The rejected size in bytes.
        size: usize,
    },
    /// A region was not aligned for the element type laid over it.
    Misaligned {
        /// Start address of the region.
        addr: usize,
        /// Required alignment in bytes.
        align: usize,
    },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapFailed { size, errno } => {
                write!(f, "failed to map {size} bytes (errno {errno})")
            }
            Self::UnmapFailed { size, errno } => {
                write!(f, "failed to unmap {size} bytes (errno {errno})")
            }
            Self::InvalidSize { size } => write!(f, "invalid mapping size: {size} bytes"),
            Self::Misaligned { addr, align } => {
                write!(f, "region at {addr:#x} is not aligned to {align} bytes")
            }
        }
    }
}

impl Error for MemoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_size_and_errno() {
        let err = MemoryError::MapFailed {
            size: 4096,
            errno: 12,
        };
        assert_eq!(err.to_string(), "failed to map 4096 bytes (errno 12)");
    }

    #[test]
    fn misaligned_formats_hex_address() {
        let err = MemoryError::Misaligned {
            addr: 0x1001,
            align: 8,
        };
        assert_eq!(err.to_string(), "region at 0x1001 is not aligned to 8 bytes");
    }
}
