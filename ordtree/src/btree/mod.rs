//! B-tree engine.
//!
//! Arena-backed B-tree with a configurable minimum degree `m`: every node
//! other than the root holds `m..=2m` keys, and every internal node has one
//! more child than it has keys. The default `m = 1` gives a 2-3 tree.
//!
//! Only in-order export is meaningful for a multiway node; pre- and
//! post-order requests are rejected with
//! [`TraversalError::UnsupportedOrder`](crate::TraversalError::UnsupportedOrder).
//!
//! # Usage
//!
//! ```ignore
//! use ordtree::btree::BTree;
//!
//! let mut tree = BTree::new(1)?;
//! for key in 1..=7 {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.height(), 2);
//! assert!(tree.validate());
//! ```

mod node;
mod tree;

pub use tree::{BTree, BTreeError, DEFAULT_MIN_DEGREE, Iter};
