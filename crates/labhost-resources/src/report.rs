//! Reconciliation run reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one desired-state check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "detail")]
pub enum Outcome {
    /// Predicate was false, apply-action ran successfully
    Applied,
    /// Predicate already held, nothing done (success, not an error)
    AlreadySatisfied,
    /// Check or apply failed; the run continued past it
    Failed(String),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Applied => write!(f, "applied"),
            Outcome::AlreadySatisfied => write!(f, "already satisfied"),
            Outcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// One resource's result within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Resource identifier
    pub id: String,
    /// What happened
    pub outcome: Outcome,
}

/// One invocation of the configurator.
///
/// Created at invocation start, discarded at process exit; the written
/// config files themselves are the persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run began
    pub started_at: DateTime<Utc>,
    /// Per-resource outcomes, in execution order
    pub checks: Vec<CheckReport>,
}

impl RunReport {
    /// Empty report stamped with the current time
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            checks: Vec::new(),
        }
    }

    /// True when every check reported "already satisfied"
    #[must_use]
    pub fn all_satisfied(&self) -> bool {
        self.checks
            .iter()
            .all(|c| c.outcome == Outcome::AlreadySatisfied)
    }

    /// Number of checks that failed
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, Outcome::Failed(_)))
            .count()
    }

    /// Number of checks whose apply-action ran
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.outcome == Outcome::Applied)
            .count()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
