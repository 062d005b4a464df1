//! Error types for `contig-vec`.
//!
//! Every fallible operation on [`Vector`](crate::Vector) and on an
//! [`AllocStrategy`](crate::AllocStrategy) reports through [`Error`]. Errors
//! are returned to the immediate caller; nothing inside the crate retries
//! or recovers from them.

use std::fmt;

/// Errors that can occur while operating on a vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The allocation strategy could not supply the requested block.
    AllocationFailed {
        /// Number of element slots requested.
        slots: usize,
        /// Size of the requested block in bytes.
        bytes: usize,
    },

    /// The requested slot count cannot be represented as a memory block.
    CapacityOverflow {
        /// Number of element slots requested.
        requested: usize,
    },

    /// Bounds-checked access past the last live element.
    OutOfRange {
        /// The index that was requested.
        index: usize,
        /// The number of live elements at the time of the request.
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AllocationFailed { slots, bytes } => {
                write!(
                    f,
                    "Allocation failed: {slots} slots ({bytes} bytes) unavailable"
                )
            }
            Error::CapacityOverflow { requested } => {
                write!(f, "Capacity overflow: {requested} slots requested")
            }
            Error::OutOfRange { index, len } => {
                write!(f, "Index out of range: index {index}, size {len}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type for `contig-vec` operations.
pub type Result<T> = std::result::Result<T, Error>;
