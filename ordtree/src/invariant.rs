//! Structural invariant violations reported by the tree validators.

/// A broken structural invariant, found by a tree's `check_invariants`.
///
/// The engines never produce one during normal operation; validators exist
/// so tests and the simulation harness can prove that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Which invariant failed.
    pub description: String,
    /// Where it failed and the mismatched values: a depth, an arena node
    /// id or the two counts that disagree. Empty when the description says
    /// it all.
    pub context: String,
}

impl InvariantViolation {
    #[must_use]
    pub fn new(description: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            context: context.into(),
        }
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}", self.description)
        } else {
            write!(f, "{} ({})", self.description, self.context)
        }
    }
}

impl std::error::Error for InvariantViolation {}
