//! Contiguous growable sequence with a pluggable allocation strategy.
//!
//! This crate provides:
//!
//! - **[`Vector`]**: a contiguous, growable sequence with doubling growth,
//!   strong panic safety on every reallocating path, and copy/move
//!   assignment that honours the strategy's propagation rules
//! - **Allocation strategies**: the [`AllocStrategy`] capability trait and
//!   the [`StdAlloc`] default backed by the global allocator
//! - **Raw storage**: [`RawStorage`], the exclusive owner of one block, and
//!   [`ConstructGuard`] for rollback while filling a fresh block
//! - **Cursors**: random-access [`Cursor`]s, the [`Reverse`] adapter and
//!   the [`Step`]/[`RandomAccess`] capabilities, whose [`Category`] tag
//!   decides how [`advance`] moves
//!
//! # Example
//!
//! ```
//! use contig_vec::{Result, Vector};
//!
//! fn squares(n: u64) -> Result<Vector<u64>> {
//!     let mut v = Vector::new();
//!     for i in 0..n {
//!         v.push_back(i * i)?;
//!     }
//!     Ok(v)
//! }
//!
//! let v = squares(5)?;
//! assert_eq!(v, [0, 1, 4, 9, 16]);
//! assert_eq!(v.capacity(), 8);
//! assert_eq!(v.rbegin().get(), Some(&16));
//! # Ok::<(), contig_vec::Error>(())
//! ```
//!
//! # Features
//!
//! - `log` (default): trace reallocations and strategy hand-overs through
//!   `contig-log`. The level is read from `CONTIG_LOG` by
//!   `contig_log::init_from_env`.

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { ::contig_log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::std::format_args!($($arg)*);
        }
    }};
}

#[cfg(feature = "log")]
macro_rules! log_trace {
    ($($arg:tt)*) => { ::contig_log::trace!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::std::format_args!($($arg)*);
        }
    }};
}

pub mod alloc;
mod assign;
pub mod cursor;
pub mod error;
pub mod growth;
pub mod iter;
pub mod raw;
pub mod reverse;
mod vector;

pub use alloc::{AllocStrategy, StdAlloc};
pub use cursor::{
    Advance, Category, Const, Constness, Cursor, Mut, Offset, RandomAccess,
    Step, StepOnly, advance,
};
pub use error::{Error, Result};
pub use iter::{IntoIter, Iter};
pub use raw::{ConstructGuard, RawStorage};
pub use reverse::Reverse;
pub use vector::Vector;
