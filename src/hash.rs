// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Incremental hash maintenance.
//!
//! The hash of a sequence `e₀ … eₙ₋₁` is the polynomial
//!
//! ```text
//! H = Σ (h(eᵢ) + 1) · P^(n-1-i)        (wrapping u64)
//! ```
//!
//! which gives the identities the decorator relies on:
//!
//! - Append: `H(s ++ [e]) = H(s) · P + h(e) + 1`
//! - Concatenation: `H(a ++ b) = H(a) · P^|b| + H(b)`
//! - Replace at `i`: `H' = H + (h(new) - h(old)) · P^(n-1-i)`
//!
//! Concatenation lets a composite fold its children's `(len, hash)` pairs
//! instead of their elements, so an untouched child's cached hash is reused
//! and the result does not depend on tree shape. The `+ 1` keeps a run of
//! zero-hash elements from vanishing.
//!
//! Every segment carries a [`HashState`]. Plain mutations only clear the
//! trusted flag. [`Hashed`] intercepts the mutations it can account for
//! cheaply and folds them in, and anything else is recomputed on the next
//! [`Hashed::hash_code`].

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;
use std::ops::Deref;

use rustc_hash::FxHasher;

use crate::error::SegmentError;
use crate::error::SegmentResult;
use crate::segment::Node;
use crate::segment::Segment;
use crate::segment::composite::Composite;
use crate::segment::leaf::Leaf;

/// Polynomial base. Odd, so multiplication is a bijection mod 2^64.
pub const HASH_BASE: u64 = 0x0000_0100_0000_01b3;

/// Bulk appends up to this many elements are folded in one by one.
pub const FOLD_LIMIT: usize = 128;

/// Cached hash value plus whether it can be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashState {
    value: u64,
    trusted: bool,
}

impl HashState {
    /// The state of an empty segment: hash 0, trusted.
    pub const EMPTY: HashState = HashState {
        value: 0,
        trusted: true,
    };

    /// A state that must be recomputed before use.
    pub const STALE: HashState = HashState {
        value: 0,
        trusted: false,
    };

    #[inline]
    pub(crate) fn trusted(value: u64) -> HashState {
        return HashState {
            value,
            trusted: true,
        };
    }

    /// The cached value. Meaningless unless [`HashState::is_trusted`].
    #[inline]
    pub fn value(&self) -> u64 {
        return self.value;
    }

    #[inline]
    pub fn is_trusted(&self) -> bool {
        return self.trusted;
    }

    #[inline]
    pub(crate) fn invalidate(&mut self) {
        self.trusted = false;
    }
}

impl Default for HashState {
    fn default() -> Self {
        return HashState::EMPTY;
    }
}

/// `HASH_BASE^exp`, wrapping.
pub fn power(mut exp: usize) -> u64 {
    let mut base = HASH_BASE;
    let mut result = 1u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    return result;
}

/// Append one element hash to a sequence hash.
#[inline]
pub fn fold(prior: u64, element_hash: u64) -> u64 {
    return prior.wrapping_mul(HASH_BASE).wrapping_add(element_hash.wrapping_add(1));
}

/// Hash of `left ++ right` given both hashes and the length of `right`.
#[inline]
pub fn concat(left: u64, right: u64, right_len: usize) -> u64 {
    return left.wrapping_mul(power(right_len)).wrapping_add(right);
}

/// Swap one element's hash at `from_end` positions before the end.
#[inline]
pub fn replace(prior: u64, old_hash: u64, new_hash: u64, from_end: usize) -> u64 {
    let delta = new_hash.wrapping_sub(old_hash);
    return prior.wrapping_add(delta.wrapping_mul(power(from_end)));
}

/// Element hash and equality strategy.
pub trait ElementHasher<T: ?Sized> {
    fn hash_element(&self, value: &T) -> u64;
    fn eq_elements(&self, a: &T, b: &T) -> bool;
}

/// `Hash` through `FxHasher`, equality through `PartialEq`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FxElementHasher;

impl<T: Hash + PartialEq + ?Sized> ElementHasher<T> for FxElementHasher {
    fn hash_element(&self, value: &T) -> u64 {
        let mut hasher = FxHasher::default();
        value.hash(&mut hasher);
        return hasher.finish();
    }

    fn eq_elements(&self, a: &T, b: &T) -> bool {
        return a == b;
    }
}

/// A strategy built from a pair of closures.
#[derive(Clone, Copy, Debug)]
pub struct FnHasher<H, E> {
    hash: H,
    eq: E,
}

impl<H, E> FnHasher<H, E> {
    pub fn new(hash: H, eq: E) -> FnHasher<H, E> {
        return FnHasher { hash, eq };
    }
}

impl<T: ?Sized, H, E> ElementHasher<T> for FnHasher<H, E>
where
    H: Fn(&T) -> u64,
    E: Fn(&T, &T) -> bool,
{
    fn hash_element(&self, value: &T) -> u64 {
        return (self.hash)(value);
    }

    fn eq_elements(&self, a: &T, b: &T) -> bool {
        return (self.eq)(a, b);
    }
}

/// Segments that keep a [`HashState`] and can fold mutations into it.
pub trait RollingHash<T>: Segment<T> {
    fn hash_state(&self) -> HashState;

    /// Return the hash, recomputing whatever is not trusted.
    fn rolling_hash<H: ElementHasher<T> + ?Sized>(&mut self, hasher: &H) -> u64;

    /// Append `value`, folding `element_hash` in if the state was trusted.
    fn push_folded(&mut self, value: T, element_hash: u64) -> SegmentResult<bool>;

    /// Replace the element at `index`, adjusting a trusted state by the
    /// difference of the two element hashes.
    fn replace_folded(
        &mut self,
        index: usize,
        value: T,
        old_hash: u64,
        new_hash: u64,
    ) -> SegmentResult<T>;
}

impl<T> RollingHash<T> for Leaf<T> {
    fn hash_state(&self) -> HashState {
        return self.hash;
    }

    fn rolling_hash<H: ElementHasher<T> + ?Sized>(&mut self, hasher: &H) -> u64 {
        if self.hash.is_trusted() {
            return self.hash.value();
        }
        let value = self
            .as_slice()
            .iter()
            .fold(0, |acc, item| fold(acc, hasher.hash_element(item)));
        self.hash = HashState::trusted(value);
        return value;
    }

    fn push_folded(&mut self, value: T, element_hash: u64) -> SegmentResult<bool> {
        let prior = self.hash;
        self.push(value)?;
        if prior.is_trusted() {
            self.hash = HashState::trusted(fold(prior.value(), element_hash));
        }
        return Ok(true);
    }

    fn replace_folded(
        &mut self,
        index: usize,
        value: T,
        old_hash: u64,
        new_hash: u64,
    ) -> SegmentResult<T> {
        let prior = self.hash;
        let len = self.len();
        let old = self.set(index, value)?;
        if prior.is_trusted() {
            let from_end = len - 1 - index;
            self.hash = HashState::trusted(replace(prior.value(), old_hash, new_hash, from_end));
        }
        return Ok(old);
    }
}

impl<T> RollingHash<T> for Composite<T> {
    fn hash_state(&self) -> HashState {
        return self.hash;
    }

    fn rolling_hash<H: ElementHasher<T> + ?Sized>(&mut self, hasher: &H) -> u64 {
        if self.hash.is_trusted() {
            return self.hash.value();
        }
        let mut value = 0u64;
        for child in self.children_mut() {
            let child_hash = child.rolling_hash(hasher);
            value = concat(value, child_hash, child.len());
        }
        self.hash = HashState::trusted(value);
        return value;
    }

    fn push_folded(&mut self, value: T, element_hash: u64) -> SegmentResult<bool> {
        let prior = self.hash;
        self.push_with(|child| child.push_folded(value, element_hash))?;
        if prior.is_trusted() {
            self.hash = HashState::trusted(fold(prior.value(), element_hash));
        }
        return Ok(true);
    }

    fn replace_folded(
        &mut self,
        index: usize,
        value: T,
        old_hash: u64,
        new_hash: u64,
    ) -> SegmentResult<T> {
        let prior = self.hash;
        let len = self.len();
        let old = self.with_child_at(index, |child, local| {
            child.replace_folded(local, value, old_hash, new_hash)
        })?;
        if prior.is_trusted() {
            let from_end = len - 1 - index;
            self.hash = HashState::trusted(replace(prior.value(), old_hash, new_hash, from_end));
        }
        return Ok(old);
    }
}

impl<T> RollingHash<T> for Node<T> {
    fn hash_state(&self) -> HashState {
        return match self {
            Node::Leaf(leaf) => leaf.hash_state(),
            Node::Composite(composite) => composite.hash_state(),
        };
    }

    fn rolling_hash<H: ElementHasher<T> + ?Sized>(&mut self, hasher: &H) -> u64 {
        return match self {
            Node::Leaf(leaf) => leaf.rolling_hash(hasher),
            Node::Composite(composite) => composite.rolling_hash(hasher),
        };
    }

    fn push_folded(&mut self, value: T, element_hash: u64) -> SegmentResult<bool> {
        return match self {
            Node::Leaf(leaf) => leaf.push_folded(value, element_hash),
            Node::Composite(composite) => composite.push_folded(value, element_hash),
        };
    }

    fn replace_folded(
        &mut self,
        index: usize,
        value: T,
        old_hash: u64,
        new_hash: u64,
    ) -> SegmentResult<T> {
        return match self {
            Node::Leaf(leaf) => leaf.replace_folded(index, value, old_hash, new_hash),
            Node::Composite(composite) => {
                composite.replace_folded(index, value, old_hash, new_hash)
            }
        };
    }
}

/// Decorator that keeps a segment's rolling hash current.
///
/// Reads go through `Deref`. Mutations go through the methods below so
/// that the cheap ones can be folded into the cached hash.
pub struct Hashed<T, S, H = FxElementHasher> {
    inner: S,
    hasher: H,
    _marker: PhantomData<fn() -> T>,
}

pub type HashedLeaf<T, H = FxElementHasher> = Hashed<T, Leaf<T>, H>;
pub type HashedComposite<T, H = FxElementHasher> = Hashed<T, Composite<T>, H>;

impl<T, S> Hashed<T, S, FxElementHasher> {
    pub fn new(inner: S) -> Hashed<T, S, FxElementHasher> {
        return Hashed::with_hasher(inner, FxElementHasher);
    }
}

impl<T, S, H> Hashed<T, S, H> {
    pub fn with_hasher(inner: S, hasher: H) -> Hashed<T, S, H> {
        return Hashed {
            inner,
            hasher,
            _marker: PhantomData,
        };
    }

    pub fn inner(&self) -> &S {
        return &self.inner;
    }

    pub fn hasher(&self) -> &H {
        return &self.hasher;
    }

    pub fn into_inner(self) -> S {
        return self.inner;
    }
}

impl<T, S: Clone, H: Clone> Clone for Hashed<T, S, H> {
    fn clone(&self) -> Self {
        return Hashed::with_hasher(self.inner.clone(), self.hasher.clone());
    }
}

impl<T, S: fmt::Debug, H> fmt::Debug for Hashed<T, S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_struct("Hashed").field("inner", &self.inner).finish();
    }
}

impl<T, S, H> Deref for Hashed<T, S, H> {
    type Target = S;

    fn deref(&self) -> &S {
        return &self.inner;
    }
}

impl<T, S, H> Hashed<T, S, H>
where
    S: RollingHash<T>,
    H: ElementHasher<T>,
{
    /// The hash of the current contents.
    pub fn hash_code(&mut self) -> u64 {
        return self.inner.rolling_hash(&self.hasher);
    }

    /// Whether [`Hashed::hash_code`] can answer without recomputing.
    pub fn is_trusted(&self) -> bool {
        return self.inner.hash_state().is_trusted();
    }

    pub fn push(&mut self, value: T) -> SegmentResult<bool> {
        let element_hash = self.hasher.hash_element(&value);
        return self.inner.push_folded(value, element_hash);
    }

    /// Append a run of elements. Short runs are folded in, long runs clear
    /// the trusted flag.
    pub fn extend_from_slice(&mut self, items: &[T]) -> SegmentResult<()>
    where
        T: Clone,
    {
        if items.len() <= FOLD_LIMIT {
            for item in items {
                self.push(item.clone())?;
            }
            return Ok(());
        }
        for item in items {
            self.inner.push(item.clone())?;
        }
        return Ok(());
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> SegmentResult<T> {
        let len = self.inner.len();
        let old = self
            .inner
            .get(index)
            .ok_or(SegmentError::bounds(index, len))?;
        let old_hash = self.hasher.hash_element(old);
        let new_hash = self.hasher.hash_element(&value);
        return self.inner.replace_folded(index, value, old_hash, new_hash);
    }

    pub fn insert(&mut self, index: usize, value: T) -> SegmentResult<bool> {
        return self.inner.insert(index, value);
    }

    pub fn remove_at(&mut self, index: usize) -> SegmentResult<T> {
        return self.inner.remove_at(index);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Split off the back half into its own decorated segment.
    pub fn split_half(&mut self) -> Option<Hashed<T, S, H>>
    where
        H: Clone,
    {
        let half = self.inner.split_half()?;
        return Some(Hashed::with_hasher(half, self.hasher.clone()));
    }

    /// Element-wise equality under the decorator's strategy.
    pub fn content_eq<O: Segment<T>>(&self, other: &O) -> bool {
        if self.inner.len() != other.len() {
            return false;
        }
        return self
            .inner
            .iter()
            .zip(other.iter())
            .all(|(a, b)| self.hasher.eq_elements(a, b));
    }
}
