//! Records of committed transitions.
//!
//! The executor hands back a [`TransitionRecord`] for every transition it
//! commits. [`TransitionHistory`] folds those records into an immutable log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One committed transition.
///
/// # Example
///
/// ```rust
/// use machinist::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     transition: "ignite".to_string(),
///     from: "parked".to_string(),
///     to: "idling".to_string(),
///     role: Some("driver".to_string()),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "idling");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Underscored transition name
    pub transition: String,
    /// State the entity left
    pub from: String,
    /// State the entity entered
    pub to: String,
    /// Role that performed the transition, if any
    pub role: Option<String>,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of committed transitions.
///
/// `record` returns a new history and leaves the receiver untouched.
///
/// # Example
///
/// ```rust
/// use machinist::core::{TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let record = |transition: &str, from: &str, to: &str| TransitionRecord {
///     transition: transition.to_string(),
///     from: from.to_string(),
///     to: to.to_string(),
///     role: None,
///     timestamp: Utc::now(),
/// };
///
/// let history = TransitionHistory::new()
///     .record(record("ignite", "parked", "idling"))
///     .record(record("shift_up", "idling", "first_gear"));
///
/// assert_eq!(history.path(), ["parked", "idling", "first_gear"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: Vec<TransitionRecord>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record, returning a new history.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// States visited: the first `from`, then each `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    /// Time between the first and last record. `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.first()?, self.records.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// How many times `transition` was committed.
    pub fn count(&self, transition: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.transition == transition)
            .count()
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.last()
    }
}
