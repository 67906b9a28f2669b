//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use strata_core::MemoryError;

/// Errors that can occur during bump or slot-arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The slot arena is at its configured maximum.
    CapacityExceeded {
        /// Number of slots that would be needed.
        requested: usize,
        /// Configured maximum number of slots.
        capacity: usize,
    },
    /// A single bump allocation can never fit in one page.
    AllocationTooLarge {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        align: usize,
        /// Usable bytes in one page.
        capacity: usize,
    },
    /// A configuration value was rejected at construction.
    InvalidConfig {
        /// What was wrong.
        reason: &'static str,
    },
    /// The virtual-memory source failed.
    Memory(MemoryError),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} slots, capacity {capacity} slots"
                )
            }
            Self::AllocationTooLarge {
                size,
                align,
                capacity,
            } => {
                write!(
                    f,
                    "allocation of {size} bytes (align {align}) does not fit in a {capacity} byte page"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
            Self::Memory(err) => write!(f, "virtual memory error: {err}"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Memory(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MemoryError> for ArenaError {
    fn from(err: MemoryError) -> Self {
        Self::Memory(err)
    }
}
