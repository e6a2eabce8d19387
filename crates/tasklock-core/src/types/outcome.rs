//! Results of admission and inspection calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single acquire attempt.
///
/// Neither `Denied` nor `AlreadyHeld` is an error: the first is ordinary
/// backpressure, the second reports that the same identity is still recorded
/// (a duplicate dispatch or caller bug).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireOutcome {
    /// A holder record was created with the requested lifetime.
    Acquired,
    /// The task class is at capacity.
    Denied,
    /// A record for this exact holder already exists; nothing was written.
    AlreadyHeld,
}

impl AcquireOutcome {
    /// `true` only when a new holder record was created.
    pub fn acquired(self) -> bool {
        matches!(self, Self::Acquired)
    }

    /// `true` when the holder was already recorded.
    pub fn already_held(self) -> bool {
        matches!(self, Self::AlreadyHeld)
    }

    /// The `(acquired, already_held)` pair.
    pub fn as_flags(self) -> (bool, bool) {
        (self.acquired(), self.already_held())
    }

    /// Short label used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acquired => "acquired",
            Self::Denied => "denied",
            Self::AlreadyHeld => "already_held",
        }
    }
}

impl std::fmt::Display for AcquireOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of one task class.
///
/// Informational only. It is stale the moment it is returned and must never
/// feed an admission decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassStatus {
    /// The task class prefix.
    pub prefix: String,
    /// Number of live holder records.
    pub active: u32,
    /// Postfixes of the live holders, sorted.
    pub holders: Vec<String>,
    /// When the snapshot was taken (client clock).
    pub observed_at: DateTime<Utc>,
}
