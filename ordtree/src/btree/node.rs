//! B-tree node layout.

/// A node of a [`super::BTree`], stored in the tree's arena.
///
/// `children` is empty for leaves and holds `keys.len() + 1` arena indices
/// otherwise. `parent` is `None` only for the root.
#[derive(Debug, Clone)]
pub struct BNode<K> {
    pub keys: Vec<K>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
}

impl<K> BNode<K> {
    /// A leaf holding `keys`.
    #[must_use]
    pub const fn leaf(keys: Vec<K>, parent: Option<usize>) -> Self {
        Self {
            keys,
            children: Vec::new(),
            parent,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_has_no_children() {
        let node = BNode::leaf(vec![1, 2], Some(0));
        assert!(node.is_leaf());
        assert_eq!(node.parent, Some(0));
    }

    #[test]
    fn test_internal_node_is_not_leaf() {
        let node = BNode {
            keys: vec![10],
            children: vec![4, 7],
            parent: None,
        };
        assert!(!node.is_leaf());
    }
}
