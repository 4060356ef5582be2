//! Height-balanced binary search tree.
//!
//! Insertion and removal recurse down to the affected position and rebuild
//! every ancestor through [`adjust_tree`] on the way back up, so each
//! recursive call returns the (possibly rotated) root of its subtree.
//!
//! Equal keys are accepted: a key that does not compare less than a node is
//! routed to its right subtree.

use std::cmp::Ordering;

use crate::avl::node::{AvlNode, Link, adjust_tree, balance_factor, height};
use crate::invariant::InvariantViolation;
use crate::ordered_tree::OrderedTree;
use crate::traversal::{TraversalError, TraversalOrder};

/// An AVL tree over keys with a total order.
#[derive(Debug, Clone)]
pub struct AvlTree<K> {
    root: Link<K>,
    len: usize,
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> AvlTree<K> {
    /// Create an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of keys in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels: 0 for an empty tree, 1 for a single node.
    #[must_use]
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// The key at the root, if any.
    #[must_use]
    pub fn root_key(&self) -> Option<&K> {
        self.root.as_deref().map(|node| &node.key)
    }

    /// In-order iterator over the keys.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.root)
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Export the keys in the given order, or `None` if the tree is empty.
    #[must_use]
    pub fn export(&self, order: TraversalOrder) -> Option<Vec<K>>
    where
        K: Clone,
    {
        self.root.as_ref()?;
        let mut keys = Vec::with_capacity(self.len);
        visit(&self.root, order, &mut keys);
        Some(keys)
    }
}

impl<K: Ord> AvlTree<K> {
    /// Insert a key. Always accepted; duplicates go to the right.
    pub fn insert(&mut self, key: K) -> bool {
        self.root = Some(insert_at(self.root.take(), key));
        self.len += 1;
        true
    }

    /// Remove one occurrence of `key`.
    ///
    /// Returns the removed key, or `None` (leaving the tree untouched) when
    /// no equal key is stored.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let mut removed = None;
        self.root = remove_at(self.root.take(), key, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        } else {
            tracing::debug!("avl: remove of absent key ignored");
        }
        removed
    }

    /// Find a key equal to `key`.
    #[must_use]
    pub fn search(&self, key: &K) -> Option<&K> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.key),
            };
        }
        None
    }

    /// Whether a key equal to `key` is stored.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Verify search order, the height balance of every node, and the size
    /// counter.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut previous: Option<&K> = None;
        for (position, key) in self.iter().enumerate() {
            if previous.is_some_and(|prev| prev > key) {
                return Err(InvariantViolation::new(
                    "in-order keys are not sorted",
                    format!("at in-order position {position}"),
                ));
            }
            previous = Some(key);
        }

        let mut count = 0;
        check_balance(&self.root, 0, &mut count)?;
        if count != self.len {
            return Err(InvariantViolation::new(
                "size counter does not match node count",
                format!("counter {}, nodes {count}", self.len),
            ));
        }
        Ok(())
    }
}

fn insert_at<K: Ord>(link: Link<K>, key: K) -> Box<AvlNode<K>> {
    let Some(mut node) = link else {
        return Box::new(AvlNode::new(key));
    };
    if key < node.key {
        node.left = Some(insert_at(node.left.take(), key));
    } else {
        node.right = Some(insert_at(node.right.take(), key));
    }
    adjust_tree(node)
}

fn remove_at<K: Ord>(link: Link<K>, key: &K, removed: &mut Option<K>) -> Link<K> {
    let mut node = link?;
    match key.cmp(&node.key) {
        Ordering::Less => node.left = remove_at(node.left.take(), key, removed),
        Ordering::Greater => node.right = remove_at(node.right.take(), key, removed),
        Ordering::Equal => {
            if node.left.is_none() {
                let AvlNode { key, right, .. } = *node;
                *removed = Some(key);
                return right.map(adjust_tree);
            }
            let Some(right) = node.right.take() else {
                let AvlNode { key, left, .. } = *node;
                *removed = Some(key);
                return left.map(adjust_tree);
            };
            // Two children: the in-order successor takes this node's place
            // and its old position is unlinked from the right subtree.
            let (rest, successor) = remove_min(right);
            node.right = rest;
            *removed = Some(std::mem::replace(&mut node.key, successor));
        }
    }
    Some(adjust_tree(node))
}

/// Unlink the minimum of a subtree, returning the rebuilt subtree and the key.
fn remove_min<K>(mut node: Box<AvlNode<K>>) -> (Link<K>, K) {
    match node.left.take() {
        None => {
            let AvlNode { key, right, .. } = *node;
            (right, key)
        }
        Some(left) => {
            let (rest, min) = remove_min(left);
            node.left = rest;
            (Some(adjust_tree(node)), min)
        }
    }
}

fn visit<K: Clone>(link: &Link<K>, order: TraversalOrder, out: &mut Vec<K>) {
    let Some(node) = link else {
        return;
    };
    match order {
        TraversalOrder::Pre => {
            out.push(node.key.clone());
            visit(&node.left, order, out);
            visit(&node.right, order, out);
        }
        TraversalOrder::In => {
            visit(&node.left, order, out);
            out.push(node.key.clone());
            visit(&node.right, order, out);
        }
        TraversalOrder::Post => {
            visit(&node.left, order, out);
            visit(&node.right, order, out);
            out.push(node.key.clone());
        }
    }
}

fn check_balance<K>(
    link: &Link<K>,
    depth: usize,
    count: &mut usize,
) -> Result<(), InvariantViolation> {
    let Some(node) = link else {
        return Ok(());
    };
    *count += 1;
    let factor = balance_factor(node);
    if factor.abs() > 1 {
        return Err(InvariantViolation::new(
            "node is out of balance",
            format!("balance factor {factor} at depth {depth}"),
        ));
    }
    check_balance(&node.left, depth + 1, count)?;
    check_balance(&node.right, depth + 1, count)
}

/// In-order iterator over an [`AvlTree`].
pub struct Iter<'a, K> {
    stack: Vec<&'a AvlNode<K>>,
}

impl<'a, K> Iter<'a, K> {
    fn new(root: &'a Link<K>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a AvlNode<K>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.key)
    }
}

impl<'a, K> IntoIterator for &'a AvlTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        for key in iter {
            tree.insert(key);
        }
        tree
    }
}

impl<K: Ord> OrderedTree<K> for AvlTree<K> {
    fn insert(&mut self, key: K) -> bool {
        Self::insert(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<K> {
        Self::remove(self, key)
    }

    fn search(&self, key: &K) -> Option<&K> {
        Self::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn allows_duplicates(&self) -> bool {
        true
    }

    fn export(&self, order: TraversalOrder) -> Result<Option<Vec<K>>, TraversalError>
    where
        K: Clone,
    {
        Ok(Self::export(self, order))
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        Self::check_invariants(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pre_order(tree: &AvlTree<i32>) -> Vec<i32> {
        tree.export(TraversalOrder::Pre).unwrap_or_default()
    }

    #[test]
    fn test_insert_rotates_into_balance() {
        let mut tree = AvlTree::new();
        for key in [6, 7, 8, 3] {
            tree.insert(key);
            tree.check_invariants().expect("balanced after insert");
        }

        assert_eq!(pre_order(&tree), vec![7, 6, 3, 8]);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_mixed_insert_remove_sequence() {
        let mut tree = AvlTree::new();
        for key in [6, 7, 8, 3] {
            tree.insert(key);
        }

        assert_eq!(tree.remove(&7), Some(7));
        tree.insert(7);
        tree.insert(20);
        assert_eq!(tree.remove(&8), Some(8));
        tree.insert(15);
        assert_eq!(tree.remove(&3), Some(3));
        tree.insert(10);
        tree.insert(17);
        tree.insert(2);
        assert_eq!(tree.remove(&20), Some(20));
        assert_eq!(tree.remove(&20), None, "second remove reports not-found");

        assert_eq!(pre_order(&tree), vec![7, 6, 2, 15, 10, 17]);
        assert_eq!(tree.len(), 6);
        tree.check_invariants().expect("balanced");
    }

    #[test]
    fn test_remove_root_with_two_children_uses_successor() {
        let mut tree: AvlTree<i32> = [6, 7, 8, 3].into_iter().collect();

        assert_eq!(tree.remove(&7), Some(7));

        // 8 replaces 7, then the left-heavy root rotates right.
        assert_eq!(pre_order(&tree), vec![6, 3, 8]);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut tree: AvlTree<i32> = [1, 2, 3].into_iter().collect();
        let before = pre_order(&tree);

        assert_eq!(tree.remove(&42), None);
        assert_eq!(tree.len(), 3);
        assert_eq!(pre_order(&tree), before);

        let mut empty: AvlTree<i32> = AvlTree::new();
        assert_eq!(empty.remove(&1), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_search() {
        let tree: AvlTree<i32> = (0..50).map(|i| i * 2).collect();

        for i in 0..50 {
            assert_eq!(tree.search(&(i * 2)), Some(&(i * 2)));
            assert!(!tree.contains(&(i * 2 + 1)));
        }
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut tree: AvlTree<i32> = [5, 5, 5, 1, 9].into_iter().collect();

        assert_eq!(tree.len(), 5);
        assert_eq!(
            tree.export(TraversalOrder::In),
            Some(vec![1, 5, 5, 5, 9])
        );

        assert_eq!(tree.remove(&5), Some(5));
        assert_eq!(tree.len(), 4);
        assert!(tree.contains(&5));
        tree.check_invariants().expect("balanced with duplicates");
    }

    #[test]
    fn test_export_orders() {
        let tree: AvlTree<i32> = [2, 1, 3].into_iter().collect();

        assert_eq!(tree.export(TraversalOrder::Pre), Some(vec![2, 1, 3]));
        assert_eq!(tree.export(TraversalOrder::In), Some(vec![1, 2, 3]));
        assert_eq!(tree.export(TraversalOrder::Post), Some(vec![1, 3, 2]));
    }

    #[test]
    fn test_export_empty_tree() {
        let tree: AvlTree<i32> = AvlTree::new();
        for order in TraversalOrder::ALL {
            assert_eq!(tree.export(order), None);
        }
        assert_eq!(OrderedTree::export(&tree, TraversalOrder::Pre), Ok(None));
    }

    #[test]
    fn test_sequential_inserts_stay_logarithmic() {
        let tree: AvlTree<u32> = (0..1024).collect();

        // An AVL tree of n nodes is at most ~1.44 log2(n) tall.
        assert!(tree.height() <= 15, "height {}", tree.height());
        tree.check_invariants().expect("balanced");
    }

    #[test]
    fn test_remove_everything() {
        let mut tree: AvlTree<u32> = (0..200).collect();

        for key in (0..200).rev().step_by(3).chain((0..200).step_by(3)) {
            tree.remove(&key);
            tree.check_invariants().expect("balanced after remove");
        }
        for key in 0..200 {
            tree.remove(&key);
        }

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.export(TraversalOrder::In), None);
    }

    #[test]
    fn test_iter_matches_in_order_export() {
        let tree: AvlTree<i32> = [9, 4, 7, 1, 8, 2].into_iter().collect();
        let iterated: Vec<i32> = tree.iter().copied().collect();

        assert_eq!(Some(iterated), tree.export(TraversalOrder::In));
    }

    #[test]
    fn test_round_trip_through_in_order_export() {
        let tree: AvlTree<i32> = [50, 20, 80, 10, 30, 70, 90, 25].into_iter().collect();
        let exported = tree.export(TraversalOrder::In).unwrap_or_default();

        let copy: AvlTree<i32> = exported.iter().copied().collect();
        assert_eq!(copy.export(TraversalOrder::In), Some(exported));
    }
}
