//! Red-Black tree with subtree-size counters.
//!
//! Nodes live in an [`Arena`] and link to each other by [`NodeId`]. Every
//! absent child is the sentinel [`NIL`], whose link record is kept on the tree
//! itself so the fix-up loops can read its color and, during removal, its
//! temporary parent.
//!
//! Each node counts the nodes of its left and right subtrees. Insertion bumps
//! the counters on the way down, removal walks back up from the unlinked node,
//! and rotations recompute the two nodes they move. With exact counters the
//! size is O(1) and `select` / `rank` are O(depth).

use std::cmp::Ordering;

use crate::arena::Arena;
use crate::invariant::InvariantViolation;
use crate::ordered_tree::OrderedTree;
use crate::red_black::node::{Color, Links, NIL, NodeId, RbNode};
use crate::traversal::{TraversalError, TraversalOrder};

/// A Red-Black tree holding unique keys.
#[derive(Debug, Clone)]
pub struct RedBlackTree<K> {
    nodes: Arena<RbNode<K>>,
    nil: Links,
    root: NodeId,
    /// Every rotation performed, as (direction, pivot).
    #[cfg(test)]
    rotations: Vec<(&'static str, NodeId)>,
}

impl<K> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RedBlackTree<K> {
    /// Create an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            nil: Links::sentinel(),
            root: NIL,
            #[cfg(test)]
            rotations: Vec::new(),
        }
    }

    /// Number of keys, read from the root's counters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subtree_size(self.root)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nil = Links::sentinel();
        self.root = NIL;
    }

    /// The key at the root, if any.
    #[must_use]
    pub fn root_key(&self) -> Option<&K> {
        (!self.root.is_nil()).then(|| self.key(self.root))
    }

    /// Smallest key.
    #[must_use]
    pub fn minimum(&self) -> Option<&K> {
        (!self.root.is_nil()).then(|| self.key(self.min_node(self.root)))
    }

    /// Largest key.
    #[must_use]
    pub fn maximum(&self) -> Option<&K> {
        if self.root.is_nil() {
            return None;
        }
        let mut node = self.root;
        while !self.right(node).is_nil() {
            node = self.right(node);
        }
        Some(self.key(node))
    }

    /// The key of in-order position `index` (0-based).
    #[must_use]
    pub fn select(&self, index: usize) -> Option<&K> {
        let mut remaining = index;
        let mut current = self.root;
        while !current.is_nil() {
            let num_left = self.links(current).num_left;
            match remaining.cmp(&num_left) {
                Ordering::Less => current = self.left(current),
                Ordering::Equal => return Some(self.key(current)),
                Ordering::Greater => {
                    remaining -= num_left + 1;
                    current = self.right(current);
                }
            }
        }
        None
    }

    /// In-order iterator over the keys.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Export the keys in the given order, or `None` if the tree is empty.
    #[must_use]
    pub fn export(&self, order: TraversalOrder) -> Option<Vec<K>>
    where
        K: Clone,
    {
        if self.root.is_nil() {
            return None;
        }
        let mut keys = Vec::with_capacity(self.len());
        self.visit(self.root, order, &mut keys);
        Some(keys)
    }

    fn visit(&self, node: NodeId, order: TraversalOrder, out: &mut Vec<K>)
    where
        K: Clone,
    {
        if node.is_nil() {
            return;
        }
        let Links { left, right, .. } = *self.links(node);
        match order {
            TraversalOrder::Pre => {
                out.push(self.key(node).clone());
                self.visit(left, order, out);
                self.visit(right, order, out);
            }
            TraversalOrder::In => {
                self.visit(left, order, out);
                out.push(self.key(node).clone());
                self.visit(right, order, out);
            }
            TraversalOrder::Post => {
                self.visit(left, order, out);
                self.visit(right, order, out);
                out.push(self.key(node).clone());
            }
        }
    }

    fn links(&self, id: NodeId) -> &Links {
        if id.is_nil() {
            &self.nil
        } else {
            &self.nodes[id.slot()].links
        }
    }

    fn links_mut(&mut self, id: NodeId) -> &mut Links {
        if id.is_nil() {
            &mut self.nil
        } else {
            &mut self.nodes[id.slot()].links
        }
    }

    fn key(&self, id: NodeId) -> &K {
        &self.nodes[id.slot()].key
    }

    fn parent(&self, id: NodeId) -> NodeId {
        self.links(id).parent
    }

    fn left(&self, id: NodeId) -> NodeId {
        self.links(id).left
    }

    fn right(&self, id: NodeId) -> NodeId {
        self.links(id).right
    }

    fn color(&self, id: NodeId) -> Color {
        self.links(id).color
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.links_mut(id).color = color;
    }

    fn subtree_size(&self, id: NodeId) -> usize {
        if id.is_nil() {
            0
        } else {
            let links = self.links(id);
            links.num_left + links.num_right + 1
        }
    }

    fn min_node(&self, mut node: NodeId) -> NodeId {
        while !self.left(node).is_nil() {
            node = self.left(node);
        }
        node
    }

    /// Point `parent`'s link that referenced `old` at `new`, or the root when
    /// `parent` is the sentinel.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent.is_nil() {
            self.root = new;
        } else if self.left(parent) == old {
            self.links_mut(parent).left = new;
        } else {
            self.links_mut(parent).right = new;
        }
    }

    /// Rotate `x` down to the left; its right child takes its place.
    fn rotate_left(&mut self, x: NodeId) {
        let y = self.right(x);
        let inner = self.left(y);
        tracing::trace!("red-black: left rotation");
        #[cfg(test)]
        self.rotations.push(("left", x));

        let inner_size = self.subtree_size(inner);
        let x_num_left = self.links(x).num_left;
        self.links_mut(x).num_right = inner_size;
        self.links_mut(y).num_left = x_num_left + inner_size + 1;

        self.links_mut(x).right = inner;
        if !inner.is_nil() {
            self.links_mut(inner).parent = x;
        }
        let x_parent = self.parent(x);
        self.links_mut(y).parent = x_parent;
        self.replace_child(x_parent, x, y);
        self.links_mut(y).left = x;
        self.links_mut(x).parent = y;
    }

    /// Rotate `y` down to the right; its left child takes its place.
    fn rotate_right(&mut self, y: NodeId) {
        let x = self.left(y);
        let inner = self.right(x);
        tracing::trace!("red-black: right rotation");
        #[cfg(test)]
        self.rotations.push(("right", y));

        let inner_size = self.subtree_size(inner);
        let y_num_right = self.links(y).num_right;
        self.links_mut(y).num_left = inner_size;
        self.links_mut(x).num_right = y_num_right + inner_size + 1;

        self.links_mut(y).left = inner;
        if !inner.is_nil() {
            self.links_mut(inner).parent = y;
        }
        let y_parent = self.parent(y);
        self.links_mut(x).parent = y_parent;
        self.replace_child(y_parent, y, x);
        self.links_mut(x).right = y;
        self.links_mut(y).parent = x;
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color(self.parent(z)) == Color::Red {
            let parent = self.parent(z);
            let grandparent = self.parent(parent);
            if parent == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if self.color(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                    continue;
                }
                if z == self.right(parent) {
                    z = parent;
                    self.rotate_left(z);
                }
                let parent = self.parent(z);
                let grandparent = self.parent(parent);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate_right(grandparent);
            } else {
                let uncle = self.left(grandparent);
                if self.color(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                    continue;
                }
                if z == self.left(parent) {
                    z = parent;
                    self.rotate_right(z);
                }
                let parent = self.parent(z);
                let grandparent = self.parent(parent);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate_left(grandparent);
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Decrement the counters of every ancestor of `removed`, starting at
    /// `parent`, which must still reference it.
    fn fix_node_data(&mut self, removed: NodeId, parent: NodeId) {
        let mut track = removed;
        let mut current = parent;
        while !current.is_nil() {
            let links = self.links_mut(current);
            if links.left == track {
                links.num_left -= 1;
            } else {
                links.num_right -= 1;
            }
            track = current;
            current = links.parent;
        }
    }

    /// Restore the black-height after a black node was unlinked. `x` is the
    /// node that took its place and may be the sentinel, whose parent was
    /// set for the duration of the repair.
    fn remove_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let parent = self.parent(x);
            if x == self.left(parent) {
                let mut sibling = self.right(parent);
                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.right(parent);
                }
                if self.color(self.left(sibling)) == Color::Black
                    && self.color(self.right(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = parent;
                } else {
                    if self.color(self.right(sibling)) == Color::Black {
                        let inner = self.left(sibling);
                        self.set_color(inner, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right(parent);
                    }
                    let parent_color = self.color(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let outer = self.right(sibling);
                    self.set_color(outer, Color::Black);
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = self.left(parent);
                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.left(parent);
                }
                if self.color(self.right(sibling)) == Color::Black
                    && self.color(self.left(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = parent;
                } else {
                    if self.color(self.left(sibling)) == Color::Black {
                        let inner = self.right(sibling);
                        self.set_color(inner, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left(parent);
                    }
                    let parent_color = self.color(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let outer = self.left(sibling);
                    self.set_color(outer, Color::Black);
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }
        self.set_color(x, Color::Black);
    }
}

impl<K: Ord> RedBlackTree<K> {
    /// Insert a key. Returns `false` if an equal key is already stored.
    pub fn insert(&mut self, key: K) -> bool {
        if !self.find_node(&key).is_nil() {
            return false;
        }

        let mut parent = NIL;
        let mut current = self.root;
        let mut goes_left = false;
        while !current.is_nil() {
            parent = current;
            goes_left = key < *self.key(current);
            let links = self.links_mut(current);
            if goes_left {
                links.num_left += 1;
                current = links.left;
            } else {
                links.num_right += 1;
                current = links.right;
            }
        }

        let z = NodeId::from_slot(self.nodes.allocate(RbNode {
            key,
            links: Links::leaf(parent),
        }));
        if parent.is_nil() {
            self.root = z;
        } else if goes_left {
            self.links_mut(parent).left = z;
        } else {
            self.links_mut(parent).right = z;
        }
        self.insert_fixup(z);
        true
    }

    /// Remove `key`, returning it, or `None` (tree untouched) if absent.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let z = self.find_node(key);
        if z.is_nil() {
            tracing::debug!("red-black: remove of absent key ignored");
            return None;
        }

        // `y` is the node actually unlinked: `z` itself, or its successor
        // whose key moves into `z`.
        let y = if self.left(z).is_nil() || self.right(z).is_nil() {
            z
        } else {
            self.min_node(self.right(z))
        };
        let y_links = *self.links(y);
        let x = if y_links.left.is_nil() {
            y_links.right
        } else {
            y_links.left
        };
        let spliced = self.nodes.free(y.slot());

        self.fix_node_data(y, y_links.parent);
        self.links_mut(x).parent = y_links.parent;
        self.replace_child(y_links.parent, y, x);

        let removed = if y == z {
            spliced.key
        } else {
            std::mem::replace(&mut self.nodes[z.slot()].key, spliced.key)
        };

        if y_links.color == Color::Black {
            self.remove_fixup(x);
        }
        self.nil = Links::sentinel();
        Some(removed)
    }

    /// Find a key equal to `key`.
    #[must_use]
    pub fn search(&self, key: &K) -> Option<&K> {
        let node = self.find_node(key);
        (!node.is_nil()).then(|| self.key(node))
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        !self.find_node(key).is_nil()
    }

    /// Number of stored keys strictly smaller than `key`, if `key` is stored.
    #[must_use]
    pub fn rank(&self, key: &K) -> Option<usize> {
        let mut smaller = 0;
        let mut current = self.root;
        while !current.is_nil() {
            let links = self.links(current);
            match key.cmp(self.key(current)) {
                Ordering::Less => current = links.left,
                Ordering::Greater => {
                    smaller += links.num_left + 1;
                    current = links.right;
                }
                Ordering::Equal => return Some(smaller + links.num_left),
            }
        }
        None
    }

    /// The smallest key greater than `key`, if `key` is stored.
    #[must_use]
    pub fn successor(&self, key: &K) -> Option<&K> {
        let mut node = self.find_node(key);
        if node.is_nil() {
            return None;
        }
        let right = self.right(node);
        if !right.is_nil() {
            return Some(self.key(self.min_node(right)));
        }
        let mut parent = self.parent(node);
        while !parent.is_nil() && node == self.right(parent) {
            node = parent;
            parent = self.parent(parent);
        }
        (!parent.is_nil()).then(|| self.key(parent))
    }

    /// Color of the node holding `key`.
    #[must_use]
    pub fn color_of(&self, key: &K) -> Option<Color> {
        let node = self.find_node(key);
        (!node.is_nil()).then(|| self.color(node))
    }

    fn find_node(&self, key: &K) -> NodeId {
        let mut current = self.root;
        while !current.is_nil() {
            current = match key.cmp(self.key(current)) {
                Ordering::Less => self.left(current),
                Ordering::Greater => self.right(current),
                Ordering::Equal => return current,
            };
        }
        NIL
    }

    /// Verify the coloring rules, black-height, search order, parent links
    /// and subtree counters.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.root.is_nil() {
            if !self.nodes.is_empty() {
                return Err(InvariantViolation::new(
                    "empty tree still owns nodes",
                    format!("{} live nodes", self.nodes.len()),
                ));
            }
            return Ok(());
        }
        if self.color(self.root) != Color::Black {
            return Err(InvariantViolation::new("root is red", ""));
        }
        if !self.parent(self.root).is_nil() {
            return Err(InvariantViolation::new("root has a parent", ""));
        }

        let (_, size) = self.check_subtree(self.root, None, None, 0)?;
        if size != self.nodes.len() {
            return Err(InvariantViolation::new(
                "reachable nodes do not match live nodes",
                format!("reachable {size}, live {}", self.nodes.len()),
            ));
        }
        Ok(())
    }

    /// Returns the black-height (counting the sentinel) and node count of
    /// the subtree rooted at `node`.
    fn check_subtree(
        &self,
        node: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
    ) -> Result<(usize, usize), InvariantViolation> {
        if node.is_nil() {
            return Ok((1, 0));
        }
        let links = self.links(node);
        let key = self.key(node);

        if lower.is_some_and(|lower| key <= lower) || upper.is_some_and(|upper| key >= upper) {
            return Err(InvariantViolation::new(
                "key outside the range set by its ancestors",
                format!("at depth {depth}"),
            ));
        }
        for child in [links.left, links.right] {
            if child.is_nil() {
                continue;
            }
            if self.parent(child) != node {
                return Err(InvariantViolation::new(
                    "child does not point back at its parent",
                    format!("below depth {depth}"),
                ));
            }
            if links.color == Color::Red && self.color(child) == Color::Red {
                return Err(InvariantViolation::new(
                    "red node has a red child",
                    format!("at depth {depth}"),
                ));
            }
        }

        let (left_black, left_size) = self.check_subtree(links.left, lower, Some(key), depth + 1)?;
        let (right_black, right_size) =
            self.check_subtree(links.right, Some(key), upper, depth + 1)?;
        if left_black != right_black {
            return Err(InvariantViolation::new(
                "black-height differs between subtrees",
                format!("left {left_black}, right {right_black} at depth {depth}"),
            ));
        }
        if links.num_left != left_size || links.num_right != right_size {
            return Err(InvariantViolation::new(
                "subtree counters are stale",
                format!(
                    "counted ({}, {}), actual ({left_size}, {right_size}) at depth {depth}",
                    links.num_left, links.num_right
                ),
            ));
        }

        let own_black = usize::from(links.color == Color::Black);
        Ok((left_black + own_black, left_size + right_size + 1))
    }
}

/// In-order iterator over a [`RedBlackTree`].
pub struct Iter<'a, K> {
    tree: &'a RedBlackTree<K>,
    stack: Vec<NodeId>,
}

impl<'a, K> Iter<'a, K> {
    fn new(tree: &'a RedBlackTree<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
        };
        iter.push_left_spine(tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut node: NodeId) {
        while !node.is_nil() {
            self.stack.push(node);
            node = self.tree.left(node);
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let tree = self.tree;
        self.push_left_spine(tree.right(node));
        Some(tree.key(node))
    }
}

impl<'a, K> IntoIterator for &'a RedBlackTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord> FromIterator<K> for RedBlackTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        for key in iter {
            tree.insert(key);
        }
        tree
    }
}

impl<K: Ord> OrderedTree<K> for RedBlackTree<K> {
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
        Self::len(self)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn allows_duplicates(&self) -> bool {
        false
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
