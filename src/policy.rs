// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Rebalancing policies.
//!
//! A policy tells a composite how large its children may grow before they
//! are split, how small two neighbours must be before they are glued, and
//! what kind of child to build at a given nesting depth. It plays the role
//! a fanout constant plays in a B-tree, except that the thresholds scale
//! with the number of children so that child sizes track roughly √n.
//!
//! Policies are fixed at construction and shared by every composite in one
//! tree through an `Rc`. Two trees can only be spliced together when they
//! share the same policy object.

use std::fmt;
use std::rc::Rc;

/// Children smaller than this are glued into their predecessor.
pub const GLUE_FLOOR: usize = 8;

/// What kind of child a composite builds at a given depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildKind {
    /// A flat array segment.
    Leaf,
    /// A further-nested composite.
    Composite,
}

/// Size thresholds and child factory for composites.
///
/// `depth` is the depth of the composite asking, with the root at 0.
/// Implementations must keep `min_glue_size <= max_child_size / 2` for
/// every factor, otherwise a glue can immediately undo a split.
pub trait RebalancePolicy: fmt::Debug {
    /// Initial capacity, and growth page, of freshly built leaves.
    fn default_capacity(&self) -> usize;

    /// Scaling factor derived from the current number of children.
    fn scaling_factor(&self, depth: usize, child_count: usize) -> usize;

    /// Children larger than this are split in half.
    fn max_child_size(&self, depth: usize, factor: usize) -> usize;

    /// Neighbours whose combined size is below this are glued.
    fn min_glue_size(&self, depth: usize, factor: usize) -> usize;

    /// The kind of child a composite at `depth` should build. Must return
    /// [`ChildKind::Leaf`] at some finite depth.
    fn child_kind(&self, depth: usize) -> ChildKind;
}

/// Shared handle to a policy.
pub type PolicyRef = Rc<dyn RebalancePolicy>;

/// Whether two handles point at the same policy object.
#[inline]
pub fn same_policy(a: &PolicyRef, b: &PolicyRef) -> bool {
    return std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b));
}

/// A shallow policy: every child is a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatPolicy {
    /// Initial leaf capacity.
    pub capacity: usize,
    /// Maximum child size at factor 1.
    pub max_base: usize,
    /// Glue threshold at factor 1.
    pub glue_base: usize,
}

impl Default for FlatPolicy {
    fn default() -> Self {
        return FlatPolicy {
            capacity: 32,
            max_base: 256,
            glue_base: 64,
        };
    }
}

impl FlatPolicy {
    /// Wrap the policy in a shareable handle.
    pub fn shared(self) -> PolicyRef {
        return Rc::new(self);
    }
}

impl RebalancePolicy for FlatPolicy {
    fn default_capacity(&self) -> usize {
        return self.capacity;
    }

    fn scaling_factor(&self, _depth: usize, child_count: usize) -> usize {
        return 1 + child_count / 16;
    }

    fn max_child_size(&self, _depth: usize, factor: usize) -> usize {
        return self.max_base * factor;
    }

    fn min_glue_size(&self, _depth: usize, factor: usize) -> usize {
        return self.glue_base * factor;
    }

    fn child_kind(&self, _depth: usize) -> ChildKind {
        return ChildKind::Leaf;
    }
}

/// A two-level policy: the root holds bounded composites, which hold leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NestedPolicy {
    /// Initial leaf capacity.
    pub capacity: usize,
    /// Maximum size of a root child (a composite) at factor 1.
    pub outer_max_base: usize,
    /// Glue threshold between root children at factor 1.
    pub outer_glue_base: usize,
    /// Maximum leaf size inside a nested composite at factor 1.
    pub inner_max_base: usize,
    /// Glue threshold between leaves at factor 1.
    pub inner_glue_base: usize,
    /// Cap on the factor of nested composites.
    pub inner_factor_cap: usize,
}

impl Default for NestedPolicy {
    fn default() -> Self {
        return NestedPolicy {
            capacity: 32,
            outer_max_base: 4096,
            outer_glue_base: 1024,
            inner_max_base: 256,
            inner_glue_base: 64,
            inner_factor_cap: 4,
        };
    }
}

impl NestedPolicy {
    /// Wrap the policy in a shareable handle.
    pub fn shared(self) -> PolicyRef {
        return Rc::new(self);
    }
}

impl RebalancePolicy for NestedPolicy {
    fn default_capacity(&self) -> usize {
        return self.capacity;
    }

    fn scaling_factor(&self, depth: usize, child_count: usize) -> usize {
        let factor = 1 + child_count / 16;
        if depth == 0 {
            return factor;
        }
        return factor.min(self.inner_factor_cap);
    }

    fn max_child_size(&self, depth: usize, factor: usize) -> usize {
        if depth == 0 {
            return self.outer_max_base * factor;
        }
        return self.inner_max_base * factor;
    }

    fn min_glue_size(&self, depth: usize, factor: usize) -> usize {
        if depth == 0 {
            return self.outer_glue_base * factor;
        }
        return self.inner_glue_base * factor;
    }

    fn child_kind(&self, depth: usize) -> ChildKind {
        if depth == 0 {
            return ChildKind::Composite;
        }
        return ChildKind::Leaf;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_thresholds_scale_with_children() {
        let policy = FlatPolicy::default();
        let f0 = policy.scaling_factor(0, 0);
        let f1 = policy.scaling_factor(0, 40);
        assert_eq!(f0, 1);
        assert_eq!(f1, 3);
        assert_eq!(policy.max_child_size(0, f1), 768);
        assert!(policy.min_glue_size(0, f1) <= policy.max_child_size(0, f1) / 2);
        assert_eq!(policy.child_kind(3), ChildKind::Leaf);
    }

    #[test]
    fn nested_builds_composites_then_leaves() {
        let policy = NestedPolicy::default();
        assert_eq!(policy.child_kind(0), ChildKind::Composite);
        assert_eq!(policy.child_kind(1), ChildKind::Leaf);
        assert_eq!(policy.scaling_factor(1, 1000), 4);
        assert_eq!(policy.scaling_factor(0, 1000), 63);
    }

    #[test]
    fn policy_identity_is_pointer_identity() {
        let a = FlatPolicy::default().shared();
        let b = FlatPolicy::default().shared();
        assert!(same_policy(&a, &a.clone()));
        assert!(!same_policy(&a, &b));
    }
}
