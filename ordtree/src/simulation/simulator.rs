//! Main simulator harness for deterministic simulation testing.
//!
//! This module ties together the operation generator, the model history and
//! the invariant checker, and drives any [`OrderedTree`] through them.

use crate::ordered_tree::OrderedTree;
use crate::traversal::TraversalOrder;

use super::invariants::{InvariantChecker, OperationHistory, SimulationViolation};
use super::op_gen::{OpGenConfig, Operation, OperationGenerator};

/// How often, in operations, the full in-order contents are compared.
pub const DEFAULT_CONTENTS_CHECK_INTERVAL: usize = 64;

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Operation generation configuration.
    pub op_config: OpGenConfig,
    /// Compare full contents every this many operations. Zero compares
    /// only once, at the end of the run.
    pub contents_check_interval: usize,
}

impl SimulatorConfig {
    /// Create a new simulator config with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            op_config: OpGenConfig::default(),
            contents_check_interval: DEFAULT_CONTENTS_CHECK_INTERVAL,
        }
    }

    /// Set the operation configuration.
    #[must_use]
    pub const fn with_op_config(mut self, config: OpGenConfig) -> Self {
        self.op_config = config;
        self
    }

    /// Set the remove rate.
    #[must_use]
    pub const fn with_remove_rate(mut self, rate: f64) -> Self {
        self.op_config.remove_rate = rate;
        self
    }

    /// Set the key space.
    #[must_use]
    pub const fn with_key_space(mut self, key_space: i64) -> Self {
        self.op_config.key_space = key_space;
        self
    }

    /// Set how often the full contents are compared.
    #[must_use]
    pub const fn with_contents_check_interval(mut self, interval: usize) -> Self {
        self.contents_check_interval = interval;
        self
    }
}

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Number of operations processed.
    pub operations_processed: u64,
    /// Operations the tree applied (accepted inserts, found keys).
    pub successful_operations: u64,
    /// Operations with no effect (refused duplicates, absent keys).
    pub failed_operations: u64,
    /// Invariant violations detected.
    pub invariant_violations: Vec<SimulationViolation>,
    /// Number of keys in the tree when the run ended.
    pub final_len: usize,
}

impl SimulationResult {
    /// Check if the simulation passed (no invariant violations).
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }
}

/// The main simulator harness.
///
/// Every generated operation is applied to the tree under test, its result
/// is compared against the model, and the tree's size and structural
/// invariants are checked before the next operation.
pub struct Simulator {
    config: SimulatorConfig,
    op_generator: OperationGenerator,
    history: OperationHistory,
    checker: InvariantChecker,
    operations_processed: u64,
    successful_operations: u64,
    failed_operations: u64,
}

impl Simulator {
    /// Create a new simulator with the given configuration.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let op_generator = OperationGenerator::with_config(config.seed, config.op_config.clone());

        Self {
            config,
            op_generator,
            history: OperationHistory::new(),
            checker: InvariantChecker::new(),
            operations_processed: 0,
            successful_operations: 0,
            failed_operations: 0,
        }
    }

    /// Run `operation_count` generated operations against `tree`.
    ///
    /// The tree must hold exactly what earlier runs of this simulator left
    /// in it; a fresh simulator expects an empty tree.
    pub fn run<T: OrderedTree<i64> + ?Sized>(
        &mut self,
        tree: &mut T,
        operation_count: usize,
    ) -> SimulationResult {
        if tree.len() != self.history.model_len() {
            self.checker.add_violation(SimulationViolation {
                description: "Tree does not match model at start of run".to_string(),
                operation_index: self.history.len(),
                context: format!(
                    "tree holds {} keys, model holds {}",
                    tree.len(),
                    self.history.model_len()
                ),
            });
        }

        for _ in 0..operation_count {
            let operation = self.op_generator.next_operation();
            let index = self.history.len();
            self.operations_processed += 1;

            let applied = self.apply(tree, operation, index);
            if applied {
                self.successful_operations += 1;
            } else {
                self.failed_operations += 1;
            }
            self.history.record(operation, applied);

            self.checker
                .check_size(tree.len(), self.history.model_len(), index);
            self.checker.check_structure(tree.check_invariants(), index);

            let interval = self.config.contents_check_interval;
            if interval > 0 && (index + 1).is_multiple_of(interval) {
                self.check_contents(tree, index);
            }
        }
        self.check_contents(tree, self.history.len());

        tracing::debug!(
            seed = self.config.seed,
            operations = self.operations_processed,
            violations = self.checker.violations().len(),
            "simulation: run finished"
        );

        SimulationResult {
            seed: self.config.seed,
            operations_processed: self.operations_processed,
            successful_operations: self.successful_operations,
            failed_operations: self.failed_operations,
            invariant_violations: self.checker.violations().to_vec(),
            final_len: tree.len(),
        }
    }

    /// Apply one operation and check its immediate result. Returns whether
    /// the tree applied it.
    fn apply<T: OrderedTree<i64> + ?Sized>(
        &mut self,
        tree: &mut T,
        operation: Operation,
        index: usize,
    ) -> bool {
        match operation {
            Operation::Insert(key) => {
                let expected = self.history.expects_insert(key, tree.allows_duplicates());
                let accepted = tree.insert(key);
                self.checker.check_insert(key, expected, accepted, index);
                accepted
            }
            Operation::Remove(key) => {
                let expected = self.history.contains(key);
                let removed = tree.remove(&key);
                self.checker.check_remove(key, expected, removed, index);
                removed.is_some()
            }
            Operation::Search(key) => {
                let expected = self.history.contains(key);
                let found = tree.search(&key).copied();
                self.checker.check_search(key, expected, found, index);
                found.is_some()
            }
        }
    }

    fn check_contents<T: OrderedTree<i64> + ?Sized>(&mut self, tree: &T, index: usize) {
        match tree.export(TraversalOrder::In) {
            Ok(keys) => {
                let actual = keys.unwrap_or_default();
                self.checker
                    .check_contents(&actual, &self.history.model_keys(), index);
            }
            Err(error) => self.checker.add_violation(SimulationViolation {
                description: "In-order export failed".to_string(),
                operation_index: index,
                context: error.to_string(),
            }),
        }
    }

    /// Get the operation history.
    #[must_use]
    pub const fn history(&self) -> &OperationHistory {
        &self.history
    }

    /// Get the invariant checker.
    #[must_use]
    pub const fn checker(&self) -> &InvariantChecker {
        &self.checker
    }

    /// Get statistics about the simulation.
    #[must_use]
    pub fn stats(&self) -> SimulatorStats {
        SimulatorStats {
            operations_processed: self.operations_processed,
            successful_operations: self.successful_operations,
            failed_operations: self.failed_operations,
            invariant_violations: self.checker.violations().len(),
        }
    }
}

/// Statistics about the simulation.
#[derive(Debug, Clone)]
pub struct SimulatorStats {
    /// Number of operations processed.
    pub operations_processed: u64,
    /// Number of applied operations.
    pub successful_operations: u64,
    /// Number of operations with no effect.
    pub failed_operations: u64,
    /// Number of invariant violations.
    pub invariant_violations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avl::AvlTree;
    use crate::btree::BTree;
    use crate::invariant::InvariantViolation;
    use crate::red_black::RedBlackTree;
    use crate::traversal::TraversalError;

    /// Reports removes as successful without removing anything.
    #[derive(Default)]
    struct ForgetfulTree {
        inner: AvlTree<i64>,
    }

    impl OrderedTree<i64> for ForgetfulTree {
        fn insert(&mut self, key: i64) -> bool {
            self.inner.insert(key)
        }

        fn remove(&mut self, key: &i64) -> Option<i64> {
            self.inner.search(key).copied()
        }

        fn search(&self, key: &i64) -> Option<&i64> {
            self.inner.search(key)
        }

        fn len(&self) -> usize {
            self.inner.len()
        }

        fn clear(&mut self) {
            self.inner.clear();
        }

        fn allows_duplicates(&self) -> bool {
            true
        }

        fn export(&self, order: TraversalOrder) -> Result<Option<Vec<i64>>, TraversalError> {
            Ok(self.inner.export(order))
        }

        fn check_invariants(&self) -> Result<(), InvariantViolation> {
            self.inner.check_invariants()
        }
    }

    #[test]
    fn test_simulator_basic() {
        let mut simulator = Simulator::new(SimulatorConfig::new(12345));
        let mut tree = AvlTree::new();

        let result = simulator.run(&mut tree, 100);

        assert_eq!(result.operations_processed, 100);
        assert_eq!(result.successful_operations + result.failed_operations, 100);
        assert_eq!(result.final_len, tree.len());
        assert_eq!(simulator.history().len(), 100);
    }

    #[test]
    fn test_simulator_deterministic() {
        let mut first_tree = RedBlackTree::new();
        let first = Simulator::new(SimulatorConfig::new(12345)).run(&mut first_tree, 300);

        let mut second_tree = RedBlackTree::new();
        let second = Simulator::new(SimulatorConfig::new(12345)).run(&mut second_tree, 300);

        assert_eq!(first.successful_operations, second.successful_operations);
        assert_eq!(first.failed_operations, second.failed_operations);
        assert_eq!(first.final_len, second.final_len);
        assert_eq!(first_tree.export(TraversalOrder::Pre), second_tree.export(TraversalOrder::Pre));
    }

    #[test]
    fn test_simulator_no_invariant_violations() {
        let config = SimulatorConfig::new(54321).with_key_space(64);

        let mut avl = AvlTree::new();
        let result = Simulator::new(config.clone()).run(&mut avl, 2000);
        assert!(result.passed(), "AVL: {:?}", result.invariant_violations);

        let mut red_black = RedBlackTree::new();
        let result = Simulator::new(config.clone()).run(&mut red_black, 2000);
        assert!(result.passed(), "RB: {:?}", result.invariant_violations);
        assert!(result.failed_operations > 0);

        for degree in 1..=3 {
            let mut btree = BTree::new(degree).unwrap();
            let result = Simulator::new(config.clone()).run(&mut btree, 2000);
            assert!(
                result.passed(),
                "BT m={degree}: {:?}",
                result.invariant_violations
            );
        }
    }

    #[test]
    fn test_simulator_detects_broken_tree() {
        let config = SimulatorConfig::new(7).with_key_space(16);
        let mut simulator = Simulator::new(config);
        let mut tree = ForgetfulTree::default();

        let result = simulator.run(&mut tree, 200);

        assert!(!result.passed());
        assert!(
            result
                .invariant_violations
                .iter()
                .any(|v| v.description == "Tree size differs from model")
        );
    }

    #[test]
    fn test_simulator_rejects_prefilled_tree() {
        let mut simulator = Simulator::new(SimulatorConfig::new(1));
        let mut tree = AvlTree::new();
        tree.insert(1);

        let result = simulator.run(&mut tree, 0);

        assert!(!result.passed());
        assert_eq!(result.invariant_violations[0].operation_index, 0);
    }

    #[test]
    fn test_simulator_consecutive_runs() {
        let mut simulator = Simulator::new(SimulatorConfig::new(31));
        let mut tree = BTree::default();

        let first = simulator.run(&mut tree, 150);
        let second = simulator.run(&mut tree, 150);

        assert!(first.passed());
        assert!(second.passed(), "{:?}", second.invariant_violations);
        assert_eq!(second.operations_processed, 300);
        assert_eq!(simulator.stats().invariant_violations, 0);
    }

    #[test]
    #[ignore] // Long running test
    fn test_simulator_stress() {
        let config = SimulatorConfig::new(99999)
            .with_key_space(4096)
            .with_remove_rate(0.45);

        let mut avl = AvlTree::new();
        assert!(Simulator::new(config.clone()).run(&mut avl, 50_000).passed());

        let mut red_black = RedBlackTree::new();
        assert!(Simulator::new(config.clone()).run(&mut red_black, 50_000).passed());

        let mut btree = BTree::new(2).unwrap();
        assert!(Simulator::new(config).run(&mut btree, 50_000).passed());
    }
}
