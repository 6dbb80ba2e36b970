// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Error types for segment operations.

use thiserror::Error;

/// Result type for segment operations.
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Errors that can occur while reading or mutating a segment.
///
/// Every fault is reported at the point of detection, before any mutation
/// takes place. Nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// An index was outside the valid range for the segment.
    #[error("index {index} out of bounds for segment of length {len}")]
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// The segment length at the time of the request.
        len: usize,
    },

    /// The operation needs at least one element.
    #[error("segment is empty")]
    Empty,

    /// A plain traversal observed a mutation it did not perform.
    #[error("segment modified during traversal: expected generation {expected}, found {found}")]
    ConcurrentModification {
        /// Generation captured when the traversal started.
        expected: u64,
        /// Generation observed now.
        found: u64,
    },

    /// The backing storage could not grow.
    #[error("cannot grow segment storage to {requested} elements")]
    CapacityExhausted {
        /// The capacity that was requested.
        requested: usize,
    },

    /// Two segments expected to share one rebalancing policy do not.
    #[error("segments were built with different rebalancing policies")]
    PolicyMismatch,

    /// The operation is structurally disallowed on this kind of segment.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// The cursor has not returned an element it could remove or replace.
    #[error("cursor has no current element")]
    NoCurrent,

    /// A cursor path no longer addresses a leaf.
    #[error("cursor path no longer addresses a leaf")]
    StaleCursor,
}

impl SegmentError {
    /// Shorthand for [`SegmentError::OutOfBounds`].
    #[inline]
    pub(crate) fn bounds(index: usize, len: usize) -> SegmentError {
        return SegmentError::OutOfBounds { index, len };
    }
}
