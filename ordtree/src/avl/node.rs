//! AVL nodes, rotations and the rebalancing step.
//!
//! Nodes do not cache their height. Every balance decision recomputes the
//! heights of the two subtrees involved, which keeps the node to a key and two
//! links at the cost of extra work per rebalance.

/// An owned, possibly empty subtree.
pub type Link<K> = Option<Box<AvlNode<K>>>;

/// A node of an AVL tree.
#[derive(Debug, Clone)]
pub struct AvlNode<K> {
    pub key: K,
    pub left: Link<K>,
    pub right: Link<K>,
}

impl<K> AvlNode<K> {
    /// Create a leaf holding `key`.
    #[must_use]
    pub const fn new(key: K) -> Self {
        Self {
            key,
            left: None,
            right: None,
        }
    }
}

/// Height of a subtree: 0 when empty, otherwise 1 + the taller child.
#[must_use]
pub fn height<K>(link: &Link<K>) -> usize {
    link.as_ref()
        .map_or(0, |node| 1 + height(&node.left).max(height(&node.right)))
}

/// Balance factor, height(right) - height(left).
#[must_use]
#[allow(clippy::cast_possible_wrap)] // Heights are logarithmic in the node count
pub fn balance_factor<K>(node: &AvlNode<K>) -> isize {
    height(&node.right) as isize - height(&node.left) as isize
}

/// Single left rotation: the right child becomes the subtree root.
pub fn rotate_left<K>(mut x: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    y.left = Some(x);
    y
}

/// Single right rotation: the left child becomes the subtree root.
pub fn rotate_right<K>(mut x: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
    let Some(mut y) = x.left.take() else {
        return x;
    };
    x.left = y.right.take();
    y.right = Some(x);
    y
}

/// Right-rotate the right child, then left-rotate `x`.
pub fn rotate_double_left<K>(mut x: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
    x.right = x.right.take().map(rotate_right);
    rotate_left(x)
}

/// Left-rotate the left child, then right-rotate `x`.
pub fn rotate_double_right<K>(mut x: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
    x.left = x.left.take().map(rotate_left);
    rotate_right(x)
}

/// Restore the AVL property at `node`, assuming both subtrees satisfy it and
/// differ in height by at most two. Returns the new subtree root.
pub fn adjust_tree<K>(node: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
    let factor = balance_factor(&node);
    if factor > 1 {
        let right_leans_left = node
            .right
            .as_deref()
            .is_some_and(|right| balance_factor(right) < 0);
        if right_leans_left {
            tracing::trace!("avl: double left rotation");
            rotate_double_left(node)
        } else {
            tracing::trace!("avl: left rotation");
            rotate_left(node)
        }
    } else if factor < -1 {
        let left_leans_right = node
            .left
            .as_deref()
            .is_some_and(|left| balance_factor(left) > 0);
        if left_leans_right {
            tracing::trace!("avl: double right rotation");
            rotate_double_right(node)
        } else {
            tracing::trace!("avl: right rotation");
            rotate_right(node)
        }
    } else {
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(key: i32) -> Link<i32> {
        Some(Box::new(AvlNode::new(key)))
    }

    fn branch(key: i32, left: Link<i32>, right: Link<i32>) -> Box<AvlNode<i32>> {
        Box::new(AvlNode { key, left, right })
    }

    fn pre_order(link: &Link<i32>, out: &mut Vec<i32>) {
        if let Some(node) = link {
            out.push(node.key);
            pre_order(&node.left, out);
            pre_order(&node.right, out);
        }
    }

    fn keys(node: Box<AvlNode<i32>>) -> Vec<i32> {
        let mut out = Vec::new();
        pre_order(&Some(node), &mut out);
        out
    }

    #[test]
    fn test_height_of_empty_and_leaf() {
        assert_eq!(height::<i32>(&None), 0);
        assert_eq!(height(&leaf(1)), 1);
        assert_eq!(height(&Some(branch(2, leaf(1), None))), 2);
    }

    #[test]
    fn test_balance_factor_sign() {
        let right_heavy = branch(1, None, Some(branch(2, None, leaf(3))));
        assert_eq!(balance_factor(&right_heavy), 2);

        let left_heavy = branch(3, leaf(2), None);
        assert_eq!(balance_factor(&left_heavy), -1);
    }

    #[test]
    fn test_rotate_left_promotes_right_child() {
        // 1 -> 2 -> 3 chain becomes 2(1, 3)
        let chain = branch(1, None, Some(branch(2, None, leaf(3))));
        assert_eq!(keys(rotate_left(chain)), vec![2, 1, 3]);
    }

    #[test]
    fn test_rotate_right_keeps_inner_subtree() {
        // 4(2(1, 3), 5) becomes 2(1, 4(3, 5))
        let tree = branch(4, Some(branch(2, leaf(1), leaf(3))), leaf(5));
        assert_eq!(keys(rotate_right(tree)), vec![2, 1, 4, 3, 5]);
    }

    #[test]
    fn test_adjust_tree_double_rotation() {
        // 3(1(-, 2), -) is left-heavy with a right-leaning left child
        let tree = branch(3, Some(branch(1, None, leaf(2))), None);
        assert_eq!(keys(adjust_tree(tree)), vec![2, 1, 3]);

        // mirror: 1(-, 3(2, -))
        let tree = branch(1, None, Some(branch(3, leaf(2), None)));
        assert_eq!(keys(adjust_tree(tree)), vec![2, 1, 3]);
    }

    #[test]
    fn test_adjust_tree_leaves_balanced_node() {
        let tree = branch(2, leaf(1), None);
        assert_eq!(keys(adjust_tree(tree)), vec![2, 1]);
    }

    #[test]
    fn test_rotation_without_child_is_noop() {
        assert_eq!(keys(rotate_left(branch(1, leaf(0), None))), vec![1, 0]);
        assert_eq!(keys(rotate_right(branch(1, None, leaf(2)))), vec![1, 2]);
    }
}
