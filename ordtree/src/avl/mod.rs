//! AVL tree engine.
//!
//! Owned, pointer-linked binary search tree that keeps the heights of every
//! node's two subtrees within one of each other. Duplicate keys are stored.
//!
//! # Usage
//!
//! ```ignore
//! use ordtree::avl::AvlTree;
//! use ordtree::TraversalOrder;
//!
//! let mut tree = AvlTree::new();
//! for key in [6, 7, 8, 3] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.export(TraversalOrder::Pre), Some(vec![7, 6, 3, 8]));
//! ```

mod node;
mod tree;

pub use tree::{AvlTree, Iter};
