//! Red-Black tree engine.
//!
//! Arena-backed Red-Black tree over unique keys. Every node carries the
//! sizes of its two subtrees, which gives an O(1) `len` and O(depth)
//! order-statistics queries (`select`, `rank`).
//!
//! # Usage
//!
//! ```ignore
//! use ordtree::red_black::RedBlackTree;
//!
//! let tree: RedBlackTree<i32> = [10, 20, 30].into_iter().collect();
//! assert_eq!(tree.root_key(), Some(&20));
//! assert_eq!(tree.select(2), Some(&30));
//! assert_eq!(tree.rank(&30), Some(2));
//! ```

mod node;
mod tree;

pub use node::Color;
pub use tree::{Iter, RedBlackTree};
