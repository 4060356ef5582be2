//! Multiway balanced search tree.
//!
//! Every non-root node holds between `m` and `2m` keys, where `m` is the
//! minimum degree chosen at construction. Overfull leaves split and push
//! their median up; underfull nodes borrow from a sibling or merge with one,
//! pulling the separating key down. All leaves stay at the same depth.
//!
//! Equal keys are accepted and may end up on either side of a separator.

use crate::arena::Arena;
use crate::btree::node::BNode;
use crate::invariant::InvariantViolation;
use crate::ordered_tree::OrderedTree;
use crate::traversal::{TraversalError, TraversalOrder};

/// Minimum degree of the default ("2-3") configuration.
pub const DEFAULT_MIN_DEGREE: usize = 1;

/// Errors from B-tree construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BTreeError {
    /// The minimum degree must be at least 1.
    InvalidMinDegree(usize),
}

impl std::fmt::Display for BTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMinDegree(degree) => {
                write!(f, "minimum degree must be at least 1, got {degree}")
            }
        }
    }
}

impl std::error::Error for BTreeError {}

/// A B-tree with minimum degree `m`.
#[derive(Debug, Clone)]
pub struct BTree<K> {
    nodes: Arena<BNode<K>>,
    root: Option<usize>,
    min_degree: usize,
    len: usize,
}

impl<K> Default for BTree<K> {
    fn default() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            min_degree: DEFAULT_MIN_DEGREE,
            len: 0,
        }
    }
}

impl<K> BTree<K> {
    /// Create an empty tree whose non-root nodes hold `min_degree` to
    /// `2 * min_degree` keys.
    pub fn new(min_degree: usize) -> Result<Self, BTreeError> {
        if min_degree == 0 {
            return Err(BTreeError::InvalidMinDegree(min_degree));
        }
        Ok(Self {
            min_degree,
            ..Self::default()
        })
    }

    #[must_use]
    pub const fn min_degree(&self) -> usize {
        self.min_degree
    }

    const fn max_keys(&self) -> usize {
        2 * self.min_degree
    }

    /// Number of keys in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Edges from the root to any leaf. 0 for a single leaf or an empty tree.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(id) = current {
            current = self.nodes[id].children.first().copied();
            if current.is_some() {
                height += 1;
            }
        }
        height
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Keys of the root node, if any.
    #[must_use]
    pub fn root_keys(&self) -> Option<&[K]> {
        self.root.map(|id| self.nodes[id].keys.as_slice())
    }

    /// In-order iterator over the keys.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Export the keys in order.
    ///
    /// Only [`TraversalOrder::In`] is supported; any other order is an error
    /// whether or not the tree is empty.
    pub fn export(&self, order: TraversalOrder) -> Result<Option<Vec<K>>, TraversalError>
    where
        K: Clone,
    {
        if order != TraversalOrder::In {
            return Err(TraversalError::UnsupportedOrder(order));
        }
        if self.root.is_none() {
            return Ok(None);
        }
        Ok(Some(self.iter().cloned().collect()))
    }

    /// Split the overfull node `id`, moving the median up and repeating on
    /// the parent while it overflows. `path` holds the `(node, child index)`
    /// steps from the root down to `id`.
    fn split(&mut self, mut id: usize, mut path: Vec<(usize, usize)>) {
        let max_keys = self.max_keys();
        loop {
            let node = &mut self.nodes[id];
            debug_assert!(node.keys.len() > max_keys, "split of a node that fits");
            let median_index = node.keys.len() / 2;
            let mut right_keys = node.keys.split_off(median_index);
            let median = right_keys.remove(0);
            let right_children = if node.is_leaf() {
                Vec::new()
            } else {
                node.children.split_off(median_index + 1)
            };
            let parent = node.parent;

            let right = self.nodes.allocate(BNode::leaf(right_keys, parent));
            for &child in &right_children {
                self.nodes[child].parent = Some(right);
            }
            self.nodes[right].children = right_children;
            tracing::trace!(left = id, right, "b-tree: split node");

            let Some((parent, index)) = path.pop() else {
                let new_root = self.nodes.allocate(BNode {
                    keys: vec![median],
                    children: vec![id, right],
                    parent: None,
                });
                self.nodes[id].parent = Some(new_root);
                self.nodes[right].parent = Some(new_root);
                self.root = Some(new_root);
                tracing::debug!(height = self.height(), "b-tree: root split");
                return;
            };

            let parent_node = &mut self.nodes[parent];
            debug_assert_eq!(parent_node.children[index], id);
            parent_node.keys.insert(index, median);
            parent_node.children.insert(index + 1, right);
            if parent_node.keys.len() <= max_keys {
                return;
            }
            id = parent;
        }
    }

    /// Restore the minimum key count of node `id`, reached from the root
    /// through `path`, and of every ancestor a merge leaves underfull.
    fn combine(&mut self, mut id: usize, mut path: Vec<(usize, usize)>) {
        while let Some((parent, index)) = path.pop() {
            if self.nodes[id].keys.len() >= self.min_degree {
                return;
            }
            let parent_node = &self.nodes[parent];
            debug_assert_eq!(parent_node.children[index], id);
            let right = parent_node.children.get(index + 1).copied();
            let left = index
                .checked_sub(1)
                .map(|left| parent_node.children[left]);

            if let Some(right) = right.filter(|&right| self.can_lend(right)) {
                self.borrow_from_right(parent, index, id, right);
                return;
            }
            if let Some(left) = left.filter(|&left| self.can_lend(left)) {
                self.borrow_from_left(parent, index, id, left);
                return;
            }

            // Every internal node has at least two children, so a node
            // without a right sibling has a left one.
            let separator = if right.is_some() { index } else { index - 1 };
            let survivor = self.merge_children(parent, separator);

            if path.is_empty() {
                if self.nodes[parent].keys.is_empty() {
                    self.nodes.free(parent);
                    self.nodes[survivor].parent = None;
                    self.root = Some(survivor);
                    tracing::debug!(height = self.height(), "b-tree: root collapsed");
                }
                return;
            }
            id = parent;
        }
    }

    fn can_lend(&self, sibling: usize) -> bool {
        self.nodes[sibling].keys.len() > self.min_degree
    }

    /// Rotate the right sibling's first key up through the separator at
    /// `index` into the end of `id`.
    fn borrow_from_right(&mut self, parent: usize, index: usize, id: usize, right: usize) {
        let sibling = &mut self.nodes[right];
        let first_key = sibling.keys.remove(0);
        let first_child = (!sibling.is_leaf()).then(|| sibling.children.remove(0));

        let separator = std::mem::replace(&mut self.nodes[parent].keys[index], first_key);
        let node = &mut self.nodes[id];
        node.keys.push(separator);
        if let Some(child) = first_child {
            node.children.push(child);
            self.nodes[child].parent = Some(id);
        }
        tracing::trace!(from = right, to = id, "b-tree: borrow from right sibling");
    }

    /// Rotate the left sibling's last key up through the separator at
    /// `index - 1` into the front of `id`.
    fn borrow_from_left(&mut self, parent: usize, index: usize, id: usize, left: usize) {
        let sibling = &mut self.nodes[left];
        let last_key = sibling.keys.remove(sibling.keys.len() - 1);
        let last_child = sibling.children.pop();

        let separator = std::mem::replace(&mut self.nodes[parent].keys[index - 1], last_key);
        let node = &mut self.nodes[id];
        node.keys.insert(0, separator);
        if let Some(child) = last_child {
            node.children.insert(0, child);
            self.nodes[child].parent = Some(id);
        }
        tracing::trace!(from = left, to = id, "b-tree: borrow from left sibling");
    }

    /// Merge the children on either side of separator `index` of `parent`
    /// into the left one, pulling the separator down. Returns the survivor.
    fn merge_children(&mut self, parent: usize, index: usize) -> usize {
        let parent_node = &mut self.nodes[parent];
        let left = parent_node.children[index];
        let right = parent_node.children.remove(index + 1);
        let separator = parent_node.keys.remove(index);
        let absorbed = self.nodes.free(right);

        for &child in &absorbed.children {
            self.nodes[child].parent = Some(left);
        }
        let node = &mut self.nodes[left];
        node.keys.push(separator);
        node.keys.extend(absorbed.keys);
        node.children.extend(absorbed.children);
        tracing::trace!(survivor = left, absorbed = right, "b-tree: merge siblings");
        left
    }

    /// Free the root if it is an empty leaf, else repair an underfull node.
    fn repair(&mut self, id: usize, path: Vec<(usize, usize)>) {
        if path.is_empty() {
            if self.nodes[id].keys.is_empty() {
                self.nodes.free(id);
                self.root = None;
                tracing::debug!("b-tree: last key removed");
            }
        } else {
            self.combine(id, path);
        }
    }
}

impl<K: Ord> BTree<K> {
    /// Insert a key. Always accepted.
    pub fn insert(&mut self, key: K) -> bool {
        self.len += 1;
        let Some(mut current) = self.root else {
            self.root = Some(self.nodes.allocate(BNode::leaf(vec![key], None)));
            return true;
        };

        let mut path = Vec::new();
        loop {
            let node = &self.nodes[current];
            let index = node.keys.partition_point(|k| k < &key);
            let Some(&child) = node.children.get(index) else {
                break;
            };
            path.push((current, index));
            current = child;
        }

        let max_keys = self.max_keys();
        let leaf = &mut self.nodes[current];
        let position = leaf.keys.partition_point(|k| k <= &key);
        leaf.keys.insert(position, key);
        if leaf.keys.len() > max_keys {
            self.split(current, path);
        }
        true
    }

    /// Remove one occurrence of `key`, returning it, or `None` (tree
    /// untouched) if absent.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let Some((id, index, mut path)) = self.locate_path(key) else {
            tracing::debug!("b-tree: remove of absent key ignored");
            return None;
        };

        let removed = if self.nodes[id].is_leaf() {
            let removed = self.nodes[id].keys.remove(index);
            self.repair(id, path);
            removed
        } else {
            // The greatest key left of the separator replaces it.
            path.push((id, index));
            let mut leaf = self.nodes[id].children[index];
            while let Some(&child) = self.nodes[leaf].children.last() {
                path.push((leaf, self.nodes[leaf].children.len() - 1));
                leaf = child;
            }
            let leaf_keys = &mut self.nodes[leaf].keys;
            let predecessor = leaf_keys.remove(leaf_keys.len() - 1);
            let removed = std::mem::replace(&mut self.nodes[id].keys[index], predecessor);
            self.repair(leaf, path);
            removed
        };
        self.len -= 1;
        Some(removed)
    }

    /// Find a key equal to `key`.
    #[must_use]
    pub fn search(&self, key: &K) -> Option<&K> {
        self.locate(key)
            .map(|(id, index)| &self.nodes[id].keys[index])
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// Node and key position of the first key equal to `key` on the search
    /// path.
    fn locate(&self, key: &K) -> Option<(usize, usize)> {
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current];
            let index = node.keys.partition_point(|k| k < key);
            if node.keys.get(index).is_some_and(|k| k == key) {
                return Some((current, index));
            }
            current = *node.children.get(index)?;
        }
    }

    /// Like [`Self::locate`], also returning the `(node, child index)`
    /// steps taken from the root.
    fn locate_path(&self, key: &K) -> Option<(usize, usize, Vec<(usize, usize)>)> {
        let mut path = Vec::new();
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current];
            let index = node.keys.partition_point(|k| k < key);
            if node.keys.get(index).is_some_and(|k| k == key) {
                return Some((current, index, path));
            }
            path.push((current, index));
            current = *node.children.get(index)?;
        }
    }

    /// Whether every structural invariant holds. Logs the first violation.
    #[must_use]
    pub fn validate(&self) -> bool {
        match self.check_invariants() {
            Ok(()) => true,
            Err(violation) => {
                tracing::warn!(%violation, "b-tree: validation failed");
                false
            }
        }
    }

    /// Verify key order, key and child counts, separator ranges, parent
    /// links, uniform leaf depth and the size counter.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            if self.len != 0 || !self.nodes.is_empty() {
                return Err(InvariantViolation::new(
                    "empty tree has leftover state",
                    format!("len {}, live nodes {}", self.len, self.nodes.len()),
                ));
            }
            return Ok(());
        };
        if self.nodes[root].parent.is_some() {
            return Err(InvariantViolation::new("root has a parent", ""));
        }

        let mut walk = Walk::default();
        self.check_node(root, None, None, 0, &mut walk)?;
        if walk.keys != self.len {
            return Err(InvariantViolation::new(
                "size counter does not match key count",
                format!("counter {}, keys {}", self.len, walk.keys),
            ));
        }
        if walk.nodes != self.nodes.len() {
            return Err(InvariantViolation::new(
                "reachable nodes do not match live nodes",
                format!("reachable {}, live {}", walk.nodes, self.nodes.len()),
            ));
        }
        Ok(())
    }

    fn check_node(
        &self,
        id: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<(), InvariantViolation> {
        let node = &self.nodes[id];
        let count = node.keys.len();
        walk.nodes += 1;
        walk.keys += count;

        if node.keys.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(InvariantViolation::new(
                "node keys are not sorted",
                format!("node {id} at depth {depth}"),
            ));
        }
        let min_keys = if node.parent.is_none() {
            1
        } else {
            self.min_degree
        };
        if count < min_keys || count > self.max_keys() {
            return Err(InvariantViolation::new(
                "key count out of bounds",
                format!(
                    "node {id} holds {count}, allowed {min_keys}..={}",
                    self.max_keys()
                ),
            ));
        }
        let out_of_range = node.keys.first().zip(lower).is_some_and(|(k, lo)| k < lo)
            || node.keys.last().zip(upper).is_some_and(|(k, hi)| k > hi);
        if out_of_range {
            return Err(InvariantViolation::new(
                "key outside the range set by its separators",
                format!("node {id} at depth {depth}"),
            ));
        }

        if node.is_leaf() {
            return match walk.leaf_depth {
                Some(expected) if expected != depth => Err(InvariantViolation::new(
                    "leaves at different depths",
                    format!("node {id} at depth {depth}, expected {expected}"),
                )),
                _ => {
                    walk.leaf_depth = Some(depth);
                    Ok(())
                }
            };
        }

        if node.children.len() != count + 1 {
            return Err(InvariantViolation::new(
                "child count must be one more than key count",
                format!("node {id} has {count} keys, {} children", node.children.len()),
            ));
        }
        for (index, &child) in node.children.iter().enumerate() {
            if self.nodes.get(child).and_then(|c| c.parent) != Some(id) {
                return Err(InvariantViolation::new(
                    "child does not point back at its parent",
                    format!("child {child} of node {id}"),
                ));
            }
            let child_lower = index.checked_sub(1).map_or(lower, |i| node.keys.get(i));
            let child_upper = node.keys.get(index).or(upper);
            self.check_node(child, child_lower, child_upper, depth + 1, walk)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Walk {
    nodes: usize,
    keys: usize,
    leaf_depth: Option<usize>,
}

/// In-order iterator over a [`BTree`].
pub struct Iter<'a, K> {
    tree: &'a BTree<K>,
    /// Pending nodes with the index of the next key to yield from each.
    stack: Vec<(usize, usize)>,
}

impl<'a, K> Iter<'a, K> {
    fn new(tree: &'a BTree<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
        };
        if let Some(root) = tree.root {
            iter.push_leftmost(root);
        }
        iter
    }

    fn push_leftmost(&mut self, mut id: usize) {
        loop {
            self.stack.push((id, 0));
            match self.tree.nodes[id].children.first() {
                Some(&child) => id = child,
                None => return,
            }
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let (id, index) = self.stack.pop()?;
            let node = &tree.nodes[id];
            if index < node.keys.len() {
                self.stack.push((id, index + 1));
                if let Some(&child) = node.children.get(index + 1) {
                    self.push_leftmost(child);
                }
                return Some(&node.keys[index]);
            }
        }
    }
}

impl<'a, K> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord> OrderedTree<K> for BTree<K> {
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
        Self::export(self, order)
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        Self::check_invariants(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn tree_with(min_degree: usize, keys: impl IntoIterator<Item = i32>) -> BTree<i32> {
        let mut tree = BTree::new(min_degree).expect("valid degree");
        for key in keys {
            tree.insert(key);
        }
        tree
    }

    fn child_keys(tree: &BTree<i32>, id: usize) -> Vec<Vec<i32>> {
        tree.nodes[id]
            .children
            .iter()
            .map(|&child| tree.nodes[child].keys.clone())
            .collect()
    }

    fn in_order(tree: &BTree<i32>) -> Vec<i32> {
        tree.export(TraversalOrder::In)
            .expect("in-order supported")
            .unwrap_or_default()
    }

    #[test]
    fn test_zero_min_degree_is_rejected() {
        assert_eq!(
            BTree::<i32>::new(0).err(),
            Some(BTreeError::InvalidMinDegree(0))
        );
        assert_eq!(
            BTreeError::InvalidMinDegree(0).to_string(),
            "minimum degree must be at least 1, got 0"
        );
        assert_eq!(BTree::<i32>::default().min_degree(), DEFAULT_MIN_DEGREE);
    }

    #[test]
    fn test_ascending_inserts_split_into_two_levels() {
        let tree = tree_with(1, 1..=7);

        assert_eq!(tree.root_keys(), Some(&[4][..]));
        let root = tree.root.expect("non-empty");
        assert_eq!(child_keys(&tree, root), vec![vec![2], vec![6]]);
        let leaves: Vec<Vec<Vec<i32>>> = tree.nodes[root]
            .children
            .iter()
            .map(|&child| child_keys(&tree, child))
            .collect();
        assert_eq!(
            leaves,
            vec![vec![vec![1], vec![3]], vec![vec![5], vec![7]]]
        );
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.len(), 7);
        assert!(tree.validate());
    }

    #[test]
    fn test_first_split_creates_root() {
        let tree = tree_with(1, [1, 2, 3]);

        assert_eq!(tree.root_keys(), Some(&[2][..]));
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_only_in_order_export_is_supported() {
        let tree = tree_with(1, [3, 1, 2]);

        assert_eq!(tree.export(TraversalOrder::In), Ok(Some(vec![1, 2, 3])));
        for order in [TraversalOrder::Pre, TraversalOrder::Post] {
            assert_eq!(
                tree.export(order),
                Err(TraversalError::UnsupportedOrder(order))
            );
        }

        let empty = BTree::<i32>::default();
        assert_eq!(empty.export(TraversalOrder::In), Ok(None));
        assert_eq!(
            empty.export(TraversalOrder::Pre),
            Err(TraversalError::UnsupportedOrder(TraversalOrder::Pre))
        );
    }

    #[test]
    fn test_merge_cascades_to_root_collapse() {
        let mut tree = tree_with(1, 1..=7);

        assert_eq!(tree.remove(&1), Some(1));

        assert_eq!(tree.root_keys(), Some(&[4, 6][..]));
        let root = tree.root.expect("non-empty");
        assert_eq!(child_keys(&tree, root), vec![vec![2, 3], vec![5], vec![7]]);
        assert_eq!(tree.height(), 1);
        assert!(tree.validate());
    }

    #[test]
    fn test_internal_remove_uses_predecessor() {
        let mut tree = tree_with(1, 1..=7);
        tree.remove(&1);

        assert_eq!(tree.remove(&4), Some(4));

        assert_eq!(tree.root_keys(), Some(&[3, 6][..]));
        assert_eq!(in_order(&tree), vec![2, 3, 5, 6, 7]);
        assert!(tree.validate());
    }

    #[test]
    fn test_borrow_from_right_sibling() {
        let mut tree = tree_with(1, 1..=7);
        tree.remove(&1);
        tree.remove(&4);
        tree.remove(&5);
        assert_eq!(tree.root_keys(), Some(&[3][..]));

        assert_eq!(tree.remove(&2), Some(2));

        assert_eq!(tree.root_keys(), Some(&[6][..]));
        let root = tree.root.expect("non-empty");
        assert_eq!(child_keys(&tree, root), vec![vec![3], vec![7]]);
        assert!(tree.validate());
    }

    #[test]
    fn test_borrow_from_left_sibling() {
        let mut tree = tree_with(1, [2, 4, 6, 1]);
        // root [4], leaves [1, 2] and [6]
        assert_eq!(tree.root_keys(), Some(&[4][..]));

        assert_eq!(tree.remove(&6), Some(6));

        assert_eq!(tree.root_keys(), Some(&[2][..]));
        let root = tree.root.expect("non-empty");
        assert_eq!(child_keys(&tree, root), vec![vec![1], vec![4]]);
        assert!(tree.validate());
    }

    #[test]
    fn test_remove_last_key_empties_tree() {
        let mut tree = tree_with(2, [5]);

        assert_eq!(tree.remove(&5), Some(5));
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.export(TraversalOrder::In), Ok(None));
        assert!(tree.validate());
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut tree = tree_with(1, 1..=7);

        assert_eq!(tree.remove(&42), None);
        assert_eq!(tree.len(), 7);
        assert_eq!(in_order(&tree), (1..=7).collect::<Vec<_>>());

        let mut empty = BTree::<i32>::default();
        assert_eq!(empty.remove(&1), None);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut tree = tree_with(1, [5, 5, 5, 5, 1, 9]);

        assert_eq!(tree.len(), 6);
        assert_eq!(in_order(&tree), vec![1, 5, 5, 5, 5, 9]);
        assert!(tree.validate());

        assert_eq!(tree.remove(&5), Some(5));
        assert_eq!(tree.remove(&5), Some(5));
        assert_eq!(in_order(&tree), vec![1, 5, 5, 9]);
        assert!(tree.validate());
    }

    #[test]
    fn test_search_contains_clear() {
        let mut tree = tree_with(2, (0..100).map(|i| i * 2));

        assert_eq!(tree.search(&40), Some(&40));
        assert!(tree.contains(&198));
        assert!(!tree.contains(&41));

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(!tree.contains(&40));
    }

    #[test]
    fn test_larger_degree_stays_shallow() {
        let tree = tree_with(3, 0..1000);

        // Every non-root node holds at least 3 keys, so fan-out is >= 4.
        assert!(tree.height() <= 5, "height {}", tree.height());
        assert!(tree.validate());
    }

    #[test]
    fn test_round_trip_through_in_order_export() {
        let keys = [8, 3, 8, 1, 5, 8, 13, 3, 21, 2, 5, 34, 1, 8, 55, 0];
        let tree = tree_with(2, keys);
        let exported = in_order(&tree);
        assert_eq!(exported.len(), keys.len());

        let copy = tree_with(2, exported.iter().copied());
        assert_eq!(copy.len(), tree.len());
        assert_eq!(in_order(&copy), exported);
        assert!(copy.validate());
    }

    #[test]
    fn test_cascading_splits_and_merges_keep_links() {
        let mut tree = tree_with(1, 1..=40);
        assert!(tree.height() >= 3);
        assert!(tree.validate());

        // Alternate ends so merges and borrows happen on both sides.
        let mut remaining: Vec<i32> = (1..=40).collect();
        while !remaining.is_empty() {
            let key = if remaining.len() % 2 == 0 {
                remaining.remove(0)
            } else {
                remaining.remove(remaining.len() / 2)
            };
            assert_eq!(tree.remove(&key), Some(key));
            assert_eq!(in_order(&tree), remaining);
            if let Err(violation) = tree.check_invariants() {
                panic!("after removing {key}: {violation}");
            }
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_random_operations_match_model() {
        for (seed, min_degree) in [(11, 1), (22, 2), (33, 3)] {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut tree = BTree::new(min_degree).expect("valid degree");
            let mut model: BTreeMap<i32, usize> = BTreeMap::new();

            for step in 0..1500 {
                let key = rng.random_range(0..120);
                if rng.random::<f64>() < 0.55 {
                    tree.insert(key);
                    *model.entry(key).or_default() += 1;
                } else {
                    let expected = match model.get_mut(&key) {
                        Some(count) => {
                            *count -= 1;
                            if *count == 0 {
                                model.remove(&key);
                            }
                            Some(key)
                        }
                        None => None,
                    };
                    assert_eq!(tree.remove(&key), expected, "step {step}");
                }
                if let Err(violation) = tree.check_invariants() {
                    panic!("m={min_degree} step {step}: {violation}");
                }
            }

            let expected: Vec<i32> = model
                .iter()
                .flat_map(|(&key, &count)| std::iter::repeat_n(key, count))
                .collect();
            assert_eq!(in_order(&tree), expected);
            assert_eq!(tree.len(), expected.len());
        }
    }
}
