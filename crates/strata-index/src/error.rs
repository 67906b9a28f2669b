//! Index error types.

use std::error::Error;
use std::fmt;

/// Errors from fixed-capacity index and map operations.
///
/// A missing key is not an error; lookups and removals return `Option`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexError {
    /// Every slot holds a live key, so a new key has nowhere to go.
    Full {
        /// Number of slots in the table.
        capacity: u32,
    },
    /// The requested capacity rounds up past the largest supported table.
    CapacityOverflow {
        /// The capacity that was asked for.
        requested: u32,
    },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => {
                write!(f, "index full: all {capacity} slots hold live keys")
            }
            Self::CapacityOverflow { requested } => {
                write!(
                    f,
                    "requested capacity {requested} exceeds the maximum of {} slots",
                    crate::set::MAX_CAPACITY
                )
            }
        }
    }
}

impl Error for IndexError {}
