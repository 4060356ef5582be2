//! The operation set shared by all three engines.
//!
//! Callers that do not care which balancing strategy is underneath (the
//! simulation harness, the interactive shell's `COPY` command) are written
//! against [`OrderedTree`]. Every engine also exposes the same operations as
//! inherent methods, so the trait does not need to be in scope for ordinary
//! use.

use crate::invariant::InvariantViolation;
use crate::traversal::{TraversalError, TraversalOrder};

/// An ordered-key container with a self-balancing invariant.
pub trait OrderedTree<K: Ord> {
    /// Insert a key. Returns `false` if the tree refused it (duplicate key in
    /// a tree that keeps keys unique).
    fn insert(&mut self, key: K) -> bool;

    /// Remove one occurrence of `key`, returning it, or `None` if absent.
    fn remove(&mut self, key: &K) -> Option<K>;

    /// Find a key equal to `key`.
    fn search(&self, key: &K) -> Option<&K>;

    /// Number of keys currently stored.
    fn len(&self) -> usize;

    /// Whether the tree holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every key.
    fn clear(&mut self);

    /// Whether equal keys may be stored more than once.
    fn allows_duplicates(&self) -> bool;

    /// Export the keys in the given order.
    ///
    /// `Ok(None)` means the tree is empty, which callers must tell apart
    /// from an unsupported order.
    fn export(&self, order: TraversalOrder) -> Result<Option<Vec<K>>, TraversalError>
    where
        K: Clone;

    /// Check every structural invariant of the tree.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// Insert every key of `keys` into `tree`, returning how many were accepted.
pub fn extend_from<K: Ord, T: OrderedTree<K> + ?Sized>(
    tree: &mut T,
    keys: impl IntoIterator<Item = K>,
) -> usize {
    let mut accepted = 0;
    for key in keys {
        if tree.insert(key) {
            accepted += 1;
        }
    }
    accepted
}
