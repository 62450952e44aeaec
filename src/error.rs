use core::fmt;

use crate::raw::{MAX_ORDER, MIN_ORDER};

/// Errors reported by the containers in this crate.
///
/// Absent keys and out-of-range positions are ordinary `Option`/`Result`
/// negatives, not errors; this type covers configuration mistakes and stale
/// cursors only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A requested branching order was outside `[MIN_ORDER, MAX_ORDER]`.
    OrderOutOfRange(usize),
    /// The branching order can only be changed while the container is empty.
    OrderLocked,
    /// A [`Cursor`](crate::Cursor) was used after a structural mutation of
    /// its container.
    StaleCursor,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderOutOfRange(order) => {
                write!(f, "branching order {order} is outside {MIN_ORDER}..={MAX_ORDER}")
            }
            Self::OrderLocked => write!(f, "branching order cannot change once entries exist"),
            Self::StaleCursor => write!(f, "cursor invalidated by a structural mutation"),
        }
    }
}

impl core::error::Error for Error {}

/// Convenience alias for fallible operations in this crate.
pub type Result<T> = core::result::Result<T, Error>;
