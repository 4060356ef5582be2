//! Red-Black node layout.

/// Node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Handle to a node of a [`super::RedBlackTree`].
///
/// Id 0 is the shared sentinel that stands for every absent child and for
/// the root's parent. Real nodes use their arena slot plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The sentinel handle.
pub const NIL: NodeId = NodeId(0);

impl NodeId {
    pub const fn from_slot(slot: usize) -> Self {
        Self(slot + 1)
    }

    pub const fn is_nil(self) -> bool {
        self.0 == 0
    }

    /// Arena slot of a real node. Must not be called on [`NIL`].
    pub const fn slot(self) -> usize {
        self.0 - 1
    }
}

/// Structural fields of a node, shared in shape with the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Links {
    pub parent: NodeId,
    pub left: NodeId,
    pub right: NodeId,
    pub color: Color,
    /// Exact number of nodes in the left subtree.
    pub num_left: usize,
    /// Exact number of nodes in the right subtree.
    pub num_right: usize,
}

impl Links {
    /// Links of the sentinel: black, counters at zero, pointing nowhere.
    pub const fn sentinel() -> Self {
        Self {
            parent: NIL,
            left: NIL,
            right: NIL,
            color: Color::Black,
            num_left: 0,
            num_right: 0,
        }
    }

    /// Links of a freshly attached node: red leaf under `parent`.
    pub const fn leaf(parent: NodeId) -> Self {
        Self {
            parent,
            color: Color::Red,
            ..Self::sentinel()
        }
    }
}

/// A keyed node stored in the tree's arena.
#[derive(Debug, Clone)]
pub struct RbNode<K> {
    pub key: K,
    pub links: Links,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_slot_mapping() {
        assert!(NIL.is_nil());
        let id = NodeId::from_slot(0);
        assert!(!id.is_nil());
        assert_eq!(id.slot(), 0);
        assert_eq!(NodeId::from_slot(41).slot(), 41);
    }

    #[test]
    fn test_new_leaf_is_red_with_empty_children() {
        let parent = NodeId::from_slot(3);
        let links = Links::leaf(parent);

        assert_eq!(links.color, Color::Red);
        assert_eq!(links.parent, parent);
        assert!(links.left.is_nil() && links.right.is_nil());
        assert_eq!((links.num_left, links.num_right), (0, 0));
    }

    #[test]
    fn test_sentinel_is_black() {
        assert_eq!(Links::sentinel().color, Color::Black);
    }
}
