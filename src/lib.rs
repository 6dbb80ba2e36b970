// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Strata - hierarchical segmented sequences.
//!
//! A sequence is stored as a shallow tree of array segments. Leaves are flat
//! growable arrays; composites hold an ordered list of children and keep
//! them inside a size band by splitting and gluing as they change. Child
//! sizes grow with the number of children, so positional edits cost about
//! √n without a balanced-tree index.
//!
//! # Quick Start
//!
//! ```
//! use strata::Composite;
//! use strata::Segment;
//! use strata::SortedSegment;
//!
//! // A plain sequence.
//! let mut seq = Composite::flat();
//! for i in 0..1000 {
//!     seq.push(i).unwrap();
//! }
//! seq.insert(0, -1).unwrap();
//! assert_eq!(seq.get(0), Some(&-1));
//! assert_eq!(seq.len(), 1001);
//!
//! // Edit while walking.
//! let mut cursor = seq.cursor();
//! while let Some(item) = cursor.next() {
//!     if item % 2 == 0 {
//!         cursor.remove().unwrap();
//!     }
//! }
//! drop(cursor);
//! assert_eq!(seq.len(), 501);
//!
//! // A sorted set.
//! let mut set = SortedSegment::ascending();
//! assert!(set.add(3).unwrap());
//! assert!(set.add(1).unwrap());
//! assert!(!set.add(3).unwrap());
//! assert_eq!(set.to_vec(), vec![1, 3]);
//! ```

pub mod cursor;
pub mod error;
pub mod hash;
pub mod policy;
pub mod segment;
pub mod sorted;

pub use cursor::Direction;
pub use cursor::Walker;
pub use cursor::composite::CompositeCursor;
pub use cursor::covering::CoveringCursor;
pub use cursor::frozen::FrozenCursor;
pub use cursor::leaf::LeafCursor;
pub use error::SegmentError;
pub use error::SegmentResult;
pub use hash::ElementHasher;
pub use hash::FnHasher;
pub use hash::FxElementHasher;
pub use hash::Hashed;
pub use hash::HashedComposite;
pub use hash::HashedLeaf;
pub use hash::RollingHash;
pub use policy::FlatPolicy;
pub use policy::NestedPolicy;
pub use policy::RebalancePolicy;
pub use segment::Composite;
pub use segment::Leaf;
pub use segment::Node;
pub use segment::Segment;
pub use sorted::Natural;
pub use sorted::SortedSegment;
