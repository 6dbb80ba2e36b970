// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! End-to-end scenarios over the public API.

use std::collections::BTreeSet;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use strata::Composite;
use strata::Leaf;
use strata::Segment;
use strata::SegmentError;
use strata::SortedSegment;

// =============================================================================
// Head edits on a nested composite
// =============================================================================

#[test]
fn nested_head_inserts_then_removes() {
    let mut seq = Composite::nested();
    for i in 0..1024i64 {
        seq.push(i).unwrap();
    }
    for value in [-5, -6, -7, -8] {
        seq.insert(0, value).unwrap();
    }
    assert_eq!(seq.remove_at(2), Ok(-6));
    assert_eq!(seq.remove_at(2), Ok(-5));

    let mut expected = vec![-8, -7];
    expected.extend(0..1024);
    assert_eq!(seq.len(), expected.len());
    for (i, value) in expected.iter().enumerate() {
        assert_eq!(seq.get(i), Some(value), "index {}", i);
    }
    assert_eq!(seq.get(expected.len()), None);
}

#[test]
fn nested_grows_a_second_level() {
    let mut seq = Composite::nested();
    for i in 0..50_000u32 {
        seq.push(i).unwrap();
    }
    assert!(seq.child_count() > 1);
    assert!(seq.children().iter().all(|child| matches!(child, strata::Node::Composite(_))));
    assert_eq!(seq.get(31_337), Some(&31_337));
}

// =============================================================================
// Sorted set against a reference set
// =============================================================================

#[test]
fn sorted_matches_btree_set() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut sorted = SortedSegment::ascending();
    let mut reference = BTreeSet::new();

    for _ in 0..20_000 {
        let value: i32 = rng.gen_range(-5_000..5_000);
        assert_eq!(sorted.add(value).unwrap(), reference.insert(value));
    }

    assert_eq!(sorted.len(), reference.len());
    assert_eq!(sorted.first().ok(), reference.iter().next());
    assert_eq!(sorted.last().ok(), reference.iter().next_back());
    assert!(sorted.iter().eq(reference.iter()));

    for _ in 0..5_000 {
        let value: i32 = rng.gen_range(-5_000..5_000);
        assert_eq!(sorted.remove_value(&value), reference.remove(&value));
    }
    assert_eq!(sorted.len(), reference.len());
    assert!(sorted.iter().eq(reference.iter()));
}

#[test]
fn descending_sorted_reverses_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut sorted = SortedSegment::descending();
    let mut reference = BTreeSet::new();
    for _ in 0..2_000 {
        let value: u16 = rng.gen_range(0..500);
        assert_eq!(sorted.add(value).unwrap(), reference.insert(value));
    }
    assert!(sorted.iter().eq(reference.iter().rev()));
    assert_eq!(sorted.first().ok(), reference.iter().next_back());
}

// =============================================================================
// Leaves
// =============================================================================

#[test]
fn leaf_grows_past_default_page() {
    let mut leaf = Leaf::new();
    for i in 0..40u32 {
        leaf.push(i).unwrap();
    }
    assert_eq!(leaf.len(), 40);
    assert!(leaf.capacity() >= 40);
    for i in 0..40u32 {
        assert_eq!(leaf.get(i as usize), Some(&i));
    }
    assert_eq!(leaf.get(40), None);
    assert_eq!(leaf.set(40, 0), Err(SegmentError::OutOfBounds { index: 40, len: 40 }));
}

#[test]
fn leaf_split_halves_are_independent() {
    let mut left: Leaf<u32> = (0..10).collect();
    let mut right = left.split_half().unwrap();
    assert_eq!(left.as_slice(), &[0, 1, 2, 3, 4]);
    assert_eq!(right.as_slice(), &[5, 6, 7, 8, 9]);

    left.set(0, 100).unwrap();
    right.push(10).unwrap();
    assert_eq!(left.as_slice(), &[100, 1, 2, 3, 4]);
    assert_eq!(right.as_slice(), &[5, 6, 7, 8, 9, 10]);
}
