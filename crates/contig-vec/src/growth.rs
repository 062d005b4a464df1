//! Capacity growth policy.
//!
//! Appending to a full vector reallocates to `max(2, len * 2)` slots:
//! doubling with a floor of two for the first allocation. `reserve` does
//! not use this policy; it allocates exactly what was asked for.

use crate::error::{Error, Result};

/// Capacity of the first block allocated by an append to an empty vector.
pub const MIN_NON_ZERO_CAPACITY: usize = 2;

/// Multiplier applied to the length when an append finds the block full.
pub const GROWTH_FACTOR: usize = 2;

/// Capacity to grow to when appending to a full vector of length `len`.
///
/// # Errors
///
/// Returns `Error::CapacityOverflow` when `len * GROWTH_FACTOR` overflows.
///
/// # Examples
///
/// ```
/// use contig_vec::growth::grown_capacity;
///
/// assert_eq!(grown_capacity(0), Ok(2));
/// assert_eq!(grown_capacity(1), Ok(2));
/// assert_eq!(grown_capacity(2), Ok(4));
/// assert_eq!(grown_capacity(12), Ok(24));
/// ```
#[inline]
pub fn grown_capacity(len: usize) -> Result<usize> {
    len.checked_mul(GROWTH_FACTOR)
        .map(|grown| grown.max(MIN_NON_ZERO_CAPACITY))
        .ok_or(Error::CapacityOverflow {
            requested: len.saturating_mul(GROWTH_FACTOR),
        })
}
