//! Counting strategies for live holders.

use serde::{Deserialize, Serialize};

/// How live holders of a task class are counted.
///
/// One deployment must use one strategy for a given task class; callers
/// mixing strategies against the same prefix do not see each other's holders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingStrategy {
    /// Scan `"{prefix}:*"` inside the admission script.
    #[default]
    Enumeration,
    /// Keep a per-class index of holder deadlines, pruned on every call.
    Counter,
}

impl std::fmt::Display for CountingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enumeration => write!(f, "enumeration"),
            Self::Counter => write!(f, "counter"),
        }
    }
}
