// Three self-balancing ordered containers behind one operation set:
//  - AVL tree: owned links, height balance, duplicates allowed
//  - Red-Black tree: arena nodes with parent links and subtree counters,
//    unique keys
//  - B-tree: arena nodes with a configurable minimum degree, duplicates
//    allowed, in-order export only
//
// On top of the engines:
//  - a line-oriented shell that drives one tree of each kind
//  - a deterministic simulation harness that checks any engine against a
//    multiset model

// Forbid unwrap() in production code to prevent panics on malformed input.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod arena;
pub mod avl;
pub mod btree;
pub mod config;
pub mod invariant;
pub mod ordered_tree;
pub mod red_black;
pub mod shell;
pub mod simulation;
pub mod traversal;

pub use avl::AvlTree;
pub use btree::{BTree, BTreeError};
pub use invariant::InvariantViolation;
pub use ordered_tree::{OrderedTree, extend_from};
pub use red_black::RedBlackTree;
pub use traversal::{ParseOrderError, TraversalError, TraversalOrder};
