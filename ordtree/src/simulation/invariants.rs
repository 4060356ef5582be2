//! Invariant checking for deterministic simulation testing.
//!
//! This module keeps a model of what the tree under test should contain and
//! compares every result the tree returns against it.

use std::collections::BTreeMap;

use crate::invariant::InvariantViolation;
use crate::simulation::op_gen::Operation;

/// Tracks the history of operations and the expected tree contents.
#[derive(Debug, Default)]
pub struct OperationHistory {
    /// All operations in order, with whether the tree applied them.
    operations: Vec<(Operation, bool)>,
    /// Expected contents: key -> number of stored copies.
    model: BTreeMap<i64, usize>,
    /// Total number of stored copies across the model.
    model_len: usize,
    accepted_inserts: u64,
    rejected_inserts: u64,
    successful_removes: u64,
    missed_removes: u64,
    hit_searches: u64,
    missed_searches: u64,
}

impl OperationHistory {
    /// Create a new empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an operation and whether the tree applied it (insert
    /// accepted, remove found the key, search found the key).
    pub fn record(&mut self, operation: Operation, applied: bool) {
        match (operation, applied) {
            (Operation::Insert(key), true) => {
                *self.model.entry(key).or_default() += 1;
                self.model_len += 1;
                self.accepted_inserts += 1;
            }
            (Operation::Insert(_), false) => self.rejected_inserts += 1,
            (Operation::Remove(key), true) => {
                if let Some(count) = self.model.get_mut(&key) {
                    *count -= 1;
                    if *count == 0 {
                        self.model.remove(&key);
                    }
                    self.model_len -= 1;
                }
                self.successful_removes += 1;
            }
            (Operation::Remove(_), false) => self.missed_removes += 1,
            (Operation::Search(_), true) => self.hit_searches += 1,
            (Operation::Search(_), false) => self.missed_searches += 1,
        }
        self.operations.push((operation, applied));
    }

    /// Whether the model holds at least one copy of `key`.
    #[must_use]
    pub fn contains(&self, key: i64) -> bool {
        self.model.contains_key(&key)
    }

    /// Whether an insert of `key` should be accepted.
    #[must_use]
    pub fn expects_insert(&self, key: i64, allows_duplicates: bool) -> bool {
        allows_duplicates || !self.contains(key)
    }

    /// Expected number of keys in the tree.
    #[must_use]
    pub const fn model_len(&self) -> usize {
        self.model_len
    }

    /// Expected in-order contents of the tree.
    #[must_use]
    pub fn model_keys(&self) -> Vec<i64> {
        self.model
            .iter()
            .flat_map(|(&key, &count)| std::iter::repeat_n(key, count))
            .collect()
    }

    /// Get the number of operations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if history is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The recorded operations, in order.
    #[must_use]
    pub fn operations(&self) -> &[(Operation, bool)] {
        &self.operations
    }

    /// Get statistics.
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total_operations: self.operations.len(),
            accepted_inserts: self.accepted_inserts,
            rejected_inserts: self.rejected_inserts,
            successful_removes: self.successful_removes,
            missed_removes: self.missed_removes,
            hit_searches: self.hit_searches,
            missed_searches: self.missed_searches,
            unique_keys: self.model.len(),
        }
    }
}

/// Statistics about the operation history.
#[derive(Debug, Clone)]
pub struct HistoryStats {
    /// Total number of operations.
    pub total_operations: usize,
    /// Inserts the tree accepted.
    pub accepted_inserts: u64,
    /// Inserts the tree refused as duplicates.
    pub rejected_inserts: u64,
    /// Removes that found their key.
    pub successful_removes: u64,
    /// Removes of absent keys.
    pub missed_removes: u64,
    /// Searches that found their key.
    pub hit_searches: u64,
    /// Searches for absent keys.
    pub missed_searches: u64,
    /// Number of distinct keys in the model.
    pub unique_keys: usize,
}

/// A mismatch between the tree under test and the model, or a broken
/// structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationViolation {
    /// Description of the violation.
    pub description: String,
    /// Operation index where it was detected.
    pub operation_index: usize,
    /// Additional context.
    pub context: String,
}

/// Checker comparing tree results against the model.
pub struct InvariantChecker {
    /// Detected violations.
    violations: Vec<SimulationViolation>,
}

impl Default for InvariantChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantChecker {
    /// Create a new invariant checker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Get all violations.
    #[must_use]
    pub fn violations(&self) -> &[SimulationViolation] {
        &self.violations
    }

    /// Check if any violations were detected.
    #[must_use]
    pub const fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Clear all recorded violations.
    pub fn clear(&mut self) {
        self.violations.clear();
    }

    /// Add a violation.
    pub fn add_violation(&mut self, violation: SimulationViolation) {
        self.violations.push(violation);
    }

    fn violation(&mut self, description: &str, operation_index: usize, context: String) {
        self.violations.push(SimulationViolation {
            description: description.to_string(),
            operation_index,
            context,
        });
    }

    /// Check an insert was accepted or refused as the model predicts.
    pub fn check_insert(&mut self, key: i64, expected: bool, accepted: bool, operation_index: usize) {
        if expected != accepted {
            self.violation(
                "Insert acceptance differs from model",
                operation_index,
                format!("key {key}: expected accepted={expected}, got {accepted}"),
            );
        }
    }

    /// Check a remove found the key exactly when the model holds it, and
    /// returned an equal key.
    pub fn check_remove(
        &mut self,
        key: i64,
        expected: bool,
        removed: Option<i64>,
        operation_index: usize,
    ) {
        match removed {
            Some(found) if found != key => self.violation(
                "Remove returned a different key",
                operation_index,
                format!("asked for {key}, got {found}"),
            ),
            _ if removed.is_some() != expected => self.violation(
                "Remove outcome differs from model",
                operation_index,
                format!("key {key}: expected found={expected}, got {removed:?}"),
            ),
            _ => {}
        }
    }

    /// Check a search found the key exactly when the model holds it.
    pub fn check_search(
        &mut self,
        key: i64,
        expected: bool,
        found: Option<i64>,
        operation_index: usize,
    ) {
        if found.is_some_and(|found| found != key) || found.is_some() != expected {
            self.violation(
                "Search result differs from model",
                operation_index,
                format!("key {key}: expected found={expected}, got {found:?}"),
            );
        }
    }

    /// Check the tree's size counter against the model.
    pub fn check_size(&mut self, actual: usize, expected: usize, operation_index: usize) {
        if actual != expected {
            self.violation(
                "Tree size differs from model",
                operation_index,
                format!("expected {expected}, got {actual}"),
            );
        }
    }

    /// Record a structural invariant failure reported by the tree itself.
    pub fn check_structure(
        &mut self,
        result: Result<(), InvariantViolation>,
        operation_index: usize,
    ) {
        if let Err(violation) = result {
            tracing::warn!(%violation, operation_index, "simulation: structural invariant broken");
            self.violation(
                "Structural invariant broken",
                operation_index,
                violation.to_string(),
            );
        }
    }

    /// Check the tree's in-order export against the model's sorted keys.
    pub fn check_contents(&mut self, actual: &[i64], expected: &[i64], operation_index: usize) {
        if actual != expected {
            let first_difference = actual
                .iter()
                .zip(expected)
                .position(|(a, e)| a != e)
                .unwrap_or_else(|| actual.len().min(expected.len()));
            self.violation(
                "In-order contents differ from model",
                operation_index,
                format!(
                    "first difference at position {first_difference} (lengths {} vs {})",
                    actual.len(),
                    expected.len()
                ),
            );
        }
    }
}
