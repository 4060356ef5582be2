//! Operation generator for deterministic simulation testing.
//!
//! This module generates random but reproducible sequences of tree
//! operations over a bounded key space, so inserts, removes and searches
//! keep hitting the same keys.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for operation generation.
#[derive(Debug, Clone)]
pub struct OpGenConfig {
    /// Probability of generating a remove (0.0 - 1.0).
    pub remove_rate: f64,
    /// Probability of generating a search (0.0 - 1.0).
    pub search_rate: f64,
    /// Keys are drawn uniformly from `0..key_space`.
    pub key_space: i64,
}

impl Default for OpGenConfig {
    fn default() -> Self {
        Self {
            remove_rate: 0.3,
            search_rate: 0.2,
            key_space: 256,
        }
    }
}

/// A single generated tree operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert(i64),
    Remove(i64),
    Search(i64),
}

impl Operation {
    /// The key the operation targets.
    #[must_use]
    pub const fn key(self) -> i64 {
        match self {
            Self::Insert(key) | Self::Remove(key) | Self::Search(key) => key,
        }
    }
}

/// Generator for random [`Operation`] sequences.
///
/// Produces the same sequence for the same seed and configuration.
pub struct OperationGenerator {
    rng: StdRng,
    config: OpGenConfig,
}

impl OperationGenerator {
    /// Create a new operation generator with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, OpGenConfig::default())
    }

    /// Create a new operation generator with custom configuration.
    #[must_use]
    pub fn with_config(seed: u64, config: OpGenConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OpGenConfig {
        &self.config
    }

    /// Generate the next operation.
    pub fn next_operation(&mut self) -> Operation {
        let key = self.rng.random_range(0..self.config.key_space.max(1));
        let roll: f64 = self.rng.random();
        if roll < self.config.remove_rate {
            Operation::Remove(key)
        } else if roll < self.config.remove_rate + self.config.search_rate {
            Operation::Search(key)
        } else {
            Operation::Insert(key)
        }
    }
}

impl Iterator for OperationGenerator {
    type Item = Operation;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_operation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_deterministic() {
        let first: Vec<Operation> = OperationGenerator::new(12345).take(100).collect();
        let second: Vec<Operation> = OperationGenerator::new(12345).take(100).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_generator_different_seeds() {
        let first: Vec<Operation> = OperationGenerator::new(1).take(100).collect();
        let second: Vec<Operation> = OperationGenerator::new(2).take(100).collect();

        assert_ne!(first, second);
    }

    #[test]
    fn test_keys_stay_in_key_space() {
        let config = OpGenConfig {
            key_space: 10,
            ..OpGenConfig::default()
        };
        let generator = OperationGenerator::with_config(7, config);

        for operation in generator.take(500) {
            assert!((0..10).contains(&operation.key()), "{operation:?}");
        }
    }

    #[test]
    fn test_insert_only_config() {
        let config = OpGenConfig {
            remove_rate: 0.0,
            search_rate: 0.0,
            ..OpGenConfig::default()
        };
        let generator = OperationGenerator::with_config(3, config);

        assert!(
            generator
                .take(200)
                .all(|operation| matches!(operation, Operation::Insert(_)))
        );
    }

    #[test]
    fn test_mix_contains_every_kind() {
        let operations: Vec<Operation> = OperationGenerator::new(99).take(1000).collect();

        assert!(operations.iter().any(|op| matches!(op, Operation::Insert(_))));
        assert!(operations.iter().any(|op| matches!(op, Operation::Remove(_))));
        assert!(operations.iter().any(|op| matches!(op, Operation::Search(_))));
    }
}
