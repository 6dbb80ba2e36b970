// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Property-based tests for segments, cursors and hashes.

use proptest::prelude::*;
use strata::Composite;
use strata::FlatPolicy;
use strata::HashedComposite;
use strata::HashedLeaf;
use strata::Leaf;
use strata::NestedPolicy;
use strata::Node;
use strata::Segment;
use strata::SortedSegment;
use strata::policy::PolicyRef;

// =============================================================================
// Test helpers
// =============================================================================

/// A positional edit, with positions as fractions of the current length.
#[derive(Clone, Debug)]
enum EditOp {
    Push(i32),
    Insert { pos_pct: f64, value: i32 },
    Remove { pos_pct: f64 },
    Set { pos_pct: f64, value: i32 },
}

fn arbitrary_edit_op() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        3 => any::<i32>().prop_map(EditOp::Push),
        3 => (0.0..=1.0f64, any::<i32>()).prop_map(|(pos_pct, value)| EditOp::Insert { pos_pct, value }),
        2 => (0.0..=1.0f64).prop_map(|pos_pct| EditOp::Remove { pos_pct }),
        1 => (0.0..=1.0f64, any::<i32>()).prop_map(|(pos_pct, value)| EditOp::Set { pos_pct, value }),
    ]
}

fn small_flat() -> PolicyRef {
    return FlatPolicy {
        capacity: 4,
        max_base: 16,
        glue_base: 4,
    }
    .shared();
}

fn small_nested() -> PolicyRef {
    return NestedPolicy {
        capacity: 4,
        outer_max_base: 64,
        outer_glue_base: 16,
        inner_max_base: 16,
        inner_glue_base: 4,
        inner_factor_cap: 2,
    }
    .shared();
}

fn position(pct: f64, len: usize) -> usize {
    return ((pct * len as f64) as usize).min(len);
}

/// Apply `op` to both the segment and a plain vector.
fn apply_edit<S: Segment<i32>>(segment: &mut S, model: &mut Vec<i32>, op: &EditOp) {
    match op {
        EditOp::Push(value) => {
            segment.push(*value).unwrap();
            model.push(*value);
        }
        EditOp::Insert { pos_pct, value } => {
            let index = position(*pos_pct, model.len());
            segment.insert(index, *value).unwrap();
            model.insert(index, *value);
        }
        EditOp::Remove { pos_pct } => {
            if model.is_empty() {
                assert!(segment.remove_at(0).is_err());
                return;
            }
            let index = position(*pos_pct, model.len() - 1);
            assert_eq!(segment.remove_at(index).unwrap(), model.remove(index));
        }
        EditOp::Set { pos_pct, value } => {
            if model.is_empty() {
                return;
            }
            let index = position(*pos_pct, model.len() - 1);
            let old = std::mem::replace(&mut model[index], *value);
            assert_eq!(segment.set(index, *value).unwrap(), old);
        }
    }
}

/// Every composite's cached length equals the sum of its children.
fn sizes_add_up(composite: &Composite<i32>) -> bool {
    let total: usize = composite.children().iter().map(|node| node.len()).sum();
    if total != composite.len() {
        return false;
    }
    return composite.children().iter().all(|node| match node {
        Node::Composite(inner) => sizes_add_up(inner),
        Node::Leaf(_) => true,
    });
}

fn child_sizes(composite: &Composite<i32>) -> Vec<usize> {
    return composite.children().iter().map(|node| node.len()).collect();
}

// =============================================================================
// Structure properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The cached length matches the children after every single edit.
    #[test]
    fn size_invariant_holds_throughout(
        ops in prop::collection::vec(arbitrary_edit_op(), 1..300),
        nested in any::<bool>(),
    ) {
        let policy = if nested { small_nested() } else { small_flat() };
        let mut composite = Composite::new(policy);
        let mut model = Vec::new();
        for op in &ops {
            apply_edit(&mut composite, &mut model, op);
            prop_assert!(sizes_add_up(&composite));
            prop_assert_eq!(composite.len(), model.len());
        }
    }

    /// Splits and glues never reorder elements.
    #[test]
    fn order_matches_a_plain_vector(
        ops in prop::collection::vec(arbitrary_edit_op(), 1..400),
        nested in any::<bool>(),
    ) {
        let policy = if nested { small_nested() } else { small_flat() };
        let mut composite = Composite::new(policy);
        let mut model = Vec::new();
        for op in &ops {
            apply_edit(&mut composite, &mut model, op);
        }
        prop_assert_eq!(composite.to_vec(), model.clone());
        for (i, value) in model.iter().enumerate() {
            prop_assert_eq!(composite.get(i), Some(value));
        }
    }

    /// Leaves agree with a plain vector too.
    #[test]
    fn leaf_matches_a_plain_vector(ops in prop::collection::vec(arbitrary_edit_op(), 1..300)) {
        let mut leaf = Leaf::with_page(2);
        let mut model = Vec::new();
        for op in &ops {
            apply_edit(&mut leaf, &mut model, op);
        }
        prop_assert_eq!(leaf.as_slice(), model.as_slice());
        prop_assert!(leaf.capacity() >= leaf.len());
    }

    /// Flattening and rebuilding gives back the same elements.
    #[test]
    fn round_trip(values in prop::collection::vec(any::<i32>(), 0..2000)) {
        let composite = Composite::from_vec(small_flat(), values.clone());
        let flat = composite.to_vec();
        let rebuilt = Composite::from_vec(small_nested(), flat.clone());
        prop_assert_eq!(&flat, &values);
        prop_assert!(rebuilt.iter().eq(composite.iter()));
        prop_assert_eq!(rebuilt.into_vec(), values);
    }

    /// A second rebalance with no edit in between changes nothing.
    #[test]
    fn rebalance_is_idempotent(ops in prop::collection::vec(arbitrary_edit_op(), 1..300)) {
        let mut composite = Composite::new(small_flat());
        let mut model = Vec::new();
        for op in &ops {
            apply_edit(&mut composite, &mut model, op);
        }
        composite.rebalance();
        let shape = child_sizes(&composite);
        let count = composite.child_count();
        composite.rebalance();
        prop_assert_eq!(child_sizes(&composite), shape);
        prop_assert_eq!(composite.child_count(), count);
        prop_assert_eq!(composite.to_vec(), model);
    }
}

// =============================================================================
// Sorted properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Adjacent elements always satisfy the ordering.
    #[test]
    fn sorted_order_invariant(
        ops in prop::collection::vec((any::<bool>(), -500i32..500), 1..500),
    ) {
        let mut sorted = SortedSegment::with_policy(strata::Natural::default(), small_flat());
        for (add, value) in &ops {
            if *add {
                sorted.add(*value).unwrap();
            } else {
                sorted.remove_value(value);
            }
            let items = sorted.to_vec();
            prop_assert!(items.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    /// Lookups find exactly the elements that are present.
    #[test]
    fn sorted_lookup_agrees_with_scan(values in prop::collection::vec(-200i32..200, 0..400), needle in -250i32..250) {
        let mut sorted = SortedSegment::with_policy(strata::Natural::default(), small_nested());
        for value in &values {
            sorted.add(*value).unwrap();
        }
        let scanned = sorted.iter().position(|item| *item == needle);
        prop_assert_eq!(sorted.index_of(&needle), scanned);
        prop_assert_eq!(sorted.contains(&needle), values.contains(&needle));
    }
}

// =============================================================================
// Cursor properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Inserting through a cursor until children split, then walking on,
    /// yields the untouched tail exactly once and in order.
    #[test]
    fn cursor_stable_across_split(
        len in 1usize..200,
        start_pct in 0.0..=1.0f64,
        inserts in 1usize..120,
        nested in any::<bool>(),
    ) {
        let policy = if nested { small_nested() } else { small_flat() };
        let mut composite = Composite::from_vec(policy, (0..len as i32).collect());
        let start = position(start_pct, len);
        let mut cursor = composite.cursor_at(start).unwrap();
        for i in 0..inserts {
            cursor.add(-(i as i32) - 1).unwrap();
        }
        let mut tail = Vec::new();
        while let Some(item) = cursor.next() {
            tail.push(*item);
        }
        drop(cursor);
        prop_assert_eq!(tail, (start as i32..len as i32).collect::<Vec<_>>());
        let mut expected: Vec<i32> = (0..start as i32).collect();
        expected.extend((1..=inserts as i32).map(|i| -i));
        expected.extend(start as i32..len as i32);
        prop_assert_eq!(composite.to_vec(), expected);
        prop_assert!(sizes_add_up(&composite));
    }

    /// Removing through a cursor matches a filter.
    #[test]
    fn cursor_removal_matches_filter(values in prop::collection::vec(0i32..100, 0..500), modulus in 2i32..7) {
        let mut composite = Composite::from_vec(small_flat(), values.clone());
        let mut cursor = composite.cursor();
        while let Some(item) = cursor.next() {
            if item % modulus == 0 {
                cursor.remove().unwrap();
            }
        }
        drop(cursor);
        let expected: Vec<i32> = values.into_iter().filter(|x| x % modulus != 0).collect();
        prop_assert_eq!(composite.to_vec(), expected);
        prop_assert!(sizes_add_up(&composite));
    }
}

// =============================================================================
// Hash properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Same elements in the same order hash the same, however they got there.
    #[test]
    fn hash_is_history_independent(
        ops in prop::collection::vec(arbitrary_edit_op(), 1..200),
    ) {
        let mut built = HashedComposite::new(Composite::new(small_flat()));
        let mut model = Vec::new();
        for op in &ops {
            // Drive the decorator directly so its fast paths are exercised.
            match op {
                EditOp::Push(value) => {
                    built.push(*value).unwrap();
                    model.push(*value);
                }
                EditOp::Insert { pos_pct, value } => {
                    let index = position(*pos_pct, model.len());
                    built.insert(index, *value).unwrap();
                    model.insert(index, *value);
                }
                EditOp::Remove { pos_pct } => {
                    if !model.is_empty() {
                        let index = position(*pos_pct, model.len() - 1);
                        built.remove_at(index).unwrap();
                        model.remove(index);
                    }
                }
                EditOp::Set { pos_pct, value } => {
                    if !model.is_empty() {
                        let index = position(*pos_pct, model.len() - 1);
                        built.hash_code();
                        built.set(index, *value).unwrap();
                        model[index] = *value;
                    }
                }
            }
        }
        let mut nested = HashedComposite::new(Composite::from_vec(small_nested(), model.clone()));
        let mut leaf = HashedLeaf::new(Leaf::from_vec(model.clone()));
        let code = built.hash_code();
        prop_assert_eq!(code, nested.hash_code());
        prop_assert_eq!(code, leaf.hash_code());
    }

    /// Reordering a sequence changes its hash.
    #[test]
    fn hash_sees_order(values in prop::collection::vec(any::<i32>(), 2..100)) {
        let mut reversed = values.clone();
        reversed.reverse();
        prop_assume!(reversed != values);
        let mut forward = HashedLeaf::new(Leaf::from_vec(values));
        let mut backward = HashedLeaf::new(Leaf::from_vec(reversed));
        prop_assert_ne!(forward.hash_code(), backward.hash_code());
    }
}
