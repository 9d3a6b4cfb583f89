//! Per-site multiversion container for one variable.

use super::errors::EngineError;
use super::value_objects::{is_replicated, Timestamp, TxnId, Value, VariableId, Version};
use serde::{Deserialize, Serialize};

/// Committed history of one variable copy plus its readability flag
///
/// The history is append-only and ascending in commit time. It starts with
/// the seed version at time 0.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variable {
    id: VariableId,
    history: Vec<Version>,
    is_readable: bool,
}

impl Variable {
    pub fn new(id: VariableId, initial_value: Value) -> Self {
        Self {
            id,
            history: vec![Version::seed(initial_value)],
            is_readable: true,
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn is_replicated(&self) -> bool {
        is_replicated(self.id)
    }

    pub fn is_readable(&self) -> bool {
        self.is_readable
    }

    pub fn history(&self) -> &[Version] {
        &self.history
    }

    /// Latest committed version regardless of time
    pub fn latest(&self) -> &Version {
        // The seed version is never removed.
        &self.history[self.history.len() - 1]
    }

    /// Latest version with `commit_time <= time`
    pub fn version_at(&self, time: Timestamp) -> Result<&Version, EngineError> {
        self.history
            .iter()
            .rev()
            .find(|version| version.commit_time <= time)
            .ok_or(EngineError::NoVisibleVersion {
                variable: self.id,
                time,
            })
    }

    /// Value of the latest version with `commit_time <= time`
    pub fn read_before(&self, time: Timestamp) -> Result<Value, EngineError> {
        self.version_at(time).map(|version| version.value)
    }

    /// Append a freshly committed version and make the copy readable again.
    ///
    /// A commit time older than the newest entry is clamped so the history
    /// stays monotonic.
    pub fn append_commit(&mut self, time: Timestamp, value: Value, writer: Option<TxnId>) {
        let commit_time = time.max(self.latest().commit_time);
        self.history.push(Version {
            commit_time,
            value,
            writer,
        });
        self.is_readable = true;
    }

    pub fn mark_unreadable(&mut self) {
        self.is_readable = false;
    }
}
