//! Site: owns the variable copies the replication rule assigns to it

use super::errors::EngineError;
use super::value_objects::{resides_at, SiteId, Timestamp, TxnId, Value, VariableId};
use super::variable::Variable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Site {
    id: SiteId,
    is_up: bool,
    variables: BTreeMap<VariableId, Variable>,
    fail_times: Vec<Timestamp>,
    commit_times: BTreeMap<VariableId, Timestamp>,
}

impl Site {
    /// Build a site holding every variable the replication rule places here.
    pub fn new(id: SiteId, site_count: u32, variable_count: u32, value_scale: Value) -> Self {
        let variables: BTreeMap<VariableId, Variable> = (1..=variable_count)
            .filter(|&var| resides_at(var, id, site_count))
            .map(|var| (var, Variable::new(var, value_scale * Value::from(var))))
            .collect();
        let commit_times = variables.keys().map(|&var| (var, 0)).collect();

        Self {
            id,
            is_up: true,
            variables,
            fail_times: Vec::new(),
            commit_times,
        }
    }

    pub fn id(&self) -> SiteId {
        self.id
    }

    pub fn is_up(&self) -> bool {
        self.is_up
    }

    pub fn holds(&self, variable: VariableId) -> bool {
        self.variables.contains_key(&variable)
    }

    pub fn variable(&self, variable: VariableId) -> Option<&Variable> {
        self.variables.get(&variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn fail_times(&self) -> &[Timestamp] {
        &self.fail_times
    }

    pub fn commit_time(&self, variable: VariableId) -> Option<Timestamp> {
        self.commit_times.get(&variable).copied()
    }

    /// Whether the copy of `variable` here may be read as current data
    pub fn is_readable(&self, variable: VariableId) -> bool {
        self.is_up
            && self
                .variables
                .get(&variable)
                .map(|var| !var.is_replicated() || var.is_readable())
                .unwrap_or(false)
    }

    /// Replicated copies still waiting for a post-recovery commit
    pub fn stale_copies(&self) -> Vec<VariableId> {
        self.variables
            .values()
            .filter(|var| var.is_replicated() && !var.is_readable())
            .map(Variable::id)
            .collect()
    }

    /// Take the site down at `time`; replicated copies become unreadable.
    pub fn fail(&mut self, time: Timestamp) {
        self.is_up = false;
        self.fail_times.push(time);
        for var in self.variables.values_mut() {
            if var.is_replicated() {
                var.mark_unreadable();
            }
        }
    }

    /// Bring the site back. Replicated copies stay unreadable until rewritten.
    pub fn recover(&mut self) {
        self.is_up = true;
    }

    /// Record a committed value for a variable held here.
    pub fn commit(
        &mut self,
        variable: VariableId,
        value: Value,
        time: Timestamp,
        writer: Option<TxnId>,
    ) -> Result<(), EngineError> {
        let var = self
            .variables
            .get_mut(&variable)
            .ok_or(EngineError::VariableNotFound(variable))?;
        var.append_commit(time, value, writer);
        self.commit_times.insert(variable, time);
        Ok(())
    }

    /// True if the site failed strictly between `after` and `before`
    pub fn failed_between(&self, after: Timestamp, before: Timestamp) -> bool {
        self.fail_times
            .iter()
            .any(|&fail_time| after < fail_time && fail_time < before)
    }

    /// Latest committed value of every variable held here, ascending by id
    pub fn dump(&self) -> SiteDump {
        SiteDump {
            site: self.id,
            is_up: self.is_up,
            values: self
                .variables
                .values()
                .map(|var| (var.id(), var.latest().value))
                .collect(),
        }
    }
}

/// One line of `dump()` output
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDump {
    pub site: SiteId,
    pub is_up: bool,
    pub values: Vec<(VariableId, Value)>,
}

impl fmt::Display for SiteDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site {}", self.site)?;
        if !self.is_up {
            write!(f, " (down)")?;
        }
        write!(f, " - ")?;
        for (i, (var, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "x{var}: {value}")?;
        }
        Ok(())
    }
}
