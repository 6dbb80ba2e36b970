// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Cursors: position-aware traversal handles.
//!
//! - [`LeafCursor`](leaf::LeafCursor) walks one leaf by direct index.
//! - [`CompositeCursor`](composite::CompositeCursor) walks a whole tree,
//!   moving leaf by leaf. It is the soft cursor: it borrows its composite
//!   mutably and reuses a path buffer the composite keeps for it.
//! - [`CoveringCursor`](covering::CoveringCursor) sits on the leaf reached
//!   from a global index and forwards every mutation through the chain of
//!   owning composites so their lengths, generations and hashes stay right.
//! - [`FrozenCursor`](frozen::FrozenCursor) is read-only and borrows
//!   immutably, so any number can run side by side.
//!
//! Mutating cursors are the sanctioned way to edit during traversal. Plain
//! traversal through a [`Walker`] fails fast instead.

pub mod composite;
pub mod covering;
pub mod frozen;
pub mod leaf;

use smallvec::SmallVec;

use crate::error::SegmentError;
use crate::error::SegmentResult;

/// Child indices from a composite down to one of its leaves.
pub(crate) type Path = SmallVec<[usize; 4]>;

/// The direction of a cursor's last move.
///
/// A directionless `remove` or `set` acts on the element the last move
/// returned: the one behind the cursor after `next`, the one ahead of it
/// after `previous`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Index of the element the last move returned, for a cursor at `index`.
#[inline]
pub(crate) fn current_index(index: usize, last_move: Option<Direction>) -> SegmentResult<usize> {
    return match last_move {
        Some(Direction::Forward) => Ok(index - 1),
        Some(Direction::Backward) => Ok(index),
        None => Err(SegmentError::NoCurrent),
    };
}

/// A generation-checked traversal position.
///
/// A walker holds no borrow, so the segment stays free to mutate between
/// steps. The next step after any structural change reports
/// [`SegmentError::ConcurrentModification`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Walker {
    index: usize,
    generation: u64,
}

impl Walker {
    pub fn new(generation: u64) -> Walker {
        return Walker {
            index: 0,
            generation,
        };
    }

    /// Fail unless `generation` still matches the captured one.
    pub fn check(&self, generation: u64) -> SegmentResult<()> {
        if generation != self.generation {
            return Err(SegmentError::ConcurrentModification {
                expected: self.generation,
                found: generation,
            });
        }
        return Ok(());
    }

    #[inline]
    pub fn position(&self) -> usize {
        return self.index;
    }

    #[inline]
    pub fn advance(&mut self) {
        self.index += 1;
    }
}
