//! Deterministic Simulation Testing (DST) infrastructure.
//!
//! This module drives any [`OrderedTree`](crate::OrderedTree) with a seeded
//! stream of inserts, removes and searches and compares every result with a
//! simple multiset model.
//!
//! # Design Principles
//!
//! 1. All randomness is seeded for reproducibility
//! 2. Given the same seed, execution is identical
//! 3. Size and structural invariants are checked after every operation
//! 4. Full in-order contents are compared periodically and at the end
//!
//! # Usage
//!
//! ```ignore
//! use ordtree::simulation::{Simulator, SimulatorConfig};
//! use ordtree::RedBlackTree;
//!
//! let config = SimulatorConfig::new(12345) // seed
//!     .with_key_space(64)
//!     .with_remove_rate(0.4);
//!
//! let mut tree = RedBlackTree::new();
//! let result = Simulator::new(config).run(&mut tree, 1000);
//!
//! assert!(result.invariant_violations.is_empty());
//! ```

mod invariants;
mod op_gen;
mod simulator;

pub use invariants::{HistoryStats, InvariantChecker, OperationHistory, SimulationViolation};
pub use op_gen::{OpGenConfig, Operation, OperationGenerator};
pub use simulator::{
    DEFAULT_CONTENTS_CHECK_INTERVAL, SimulationResult, Simulator, SimulatorConfig, SimulatorStats,
};
