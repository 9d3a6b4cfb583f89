//! Per-transaction copy of one site
//!
//! Captured from a live `Site` at the transaction's start time and owned by
//! the transaction alone. Only the values visible at the start time are
//! copied, so a later refresh (after the site recovers) never leaks versions
//! committed after the transaction began.

use super::errors::EngineError;
use super::site::Site;
use super::value_objects::{is_replicated, SiteId, Timestamp, TxnId, Value, VariableId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot state of a single variable copy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCell {
    /// Value visible at the start time, or the buffered write
    pub value: Value,
    /// Commit time of the version visible at the start time
    pub version_time: Timestamp,
    /// Writer of that version
    pub writer: Option<TxnId>,
    /// Set once the owning transaction buffered a write into this copy
    pub buffered: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteSnapshot {
    site: SiteId,
    is_up: bool,
    fail_times: Vec<Timestamp>,
    cells: BTreeMap<VariableId, SnapshotCell>,
}

impl SiteSnapshot {
    /// Copy the structure of `site` as seen at time `at`.
    pub fn capture(site: &Site, at: Timestamp) -> Result<Self, EngineError> {
        let mut cells = BTreeMap::new();
        for var in site.variables() {
            let version = var.version_at(at)?;
            cells.insert(
                var.id(),
                SnapshotCell {
                    value: version.value,
                    version_time: version.commit_time,
                    writer: version.writer.clone(),
                    buffered: false,
                },
            );
        }

        Ok(Self {
            site: site.id(),
            is_up: site.is_up(),
            fail_times: site.fail_times().to_vec(),
            cells,
        })
    }

    pub fn site(&self) -> SiteId {
        self.site
    }

    pub fn is_up(&self) -> bool {
        self.is_up
    }

    pub fn cell(&self, variable: VariableId) -> Option<&SnapshotCell> {
        self.cells.get(&variable)
    }

    /// Whether this copy can serve `variable` to a transaction that started at `start_time`.
    ///
    /// A replicated copy is disqualified if the site failed after the visible
    /// version was committed and before the transaction started.
    pub fn can_serve(&self, variable: VariableId, start_time: Timestamp) -> bool {
        if !self.is_up {
            return false;
        }
        let Some(cell) = self.cells.get(&variable) else {
            return false;
        };
        if !is_replicated(variable) {
            return true;
        }
        !self
            .fail_times
            .iter()
            .any(|&fail_time| cell.version_time < fail_time && fail_time < start_time)
    }

    /// Buffer a write locally. Returns false if the copy is down or absent.
    pub fn buffer_write(&mut self, variable: VariableId, value: Value) -> bool {
        if !self.is_up {
            return false;
        }
        match self.cells.get_mut(&variable) {
            Some(cell) => {
                cell.value = value;
                cell.buffered = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_down(&mut self, time: Timestamp) {
        self.is_up = false;
        self.fail_times.push(time);
    }

    /// Whether the site keeps a copy of `variable`, up or not.
    pub fn holds(&self, variable: VariableId) -> bool {
        self.cells.contains_key(&variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_site(id: SiteId) -> Site {
        Site::new(id, 10, 20, 10)
    }

    #[test]
    fn test_capture_hides_later_commits() {
        let mut site = live_site(1);
        site.commit(2, 99, 6, Some(TxnId::from("T9"))).unwrap();

        let early = SiteSnapshot::capture(&site, 5).unwrap();
        assert_eq!(early.cell(2).unwrap().value, 20);
        assert_eq!(early.cell(2).unwrap().writer, None);

        let late = SiteSnapshot::capture(&site, 6).unwrap();
        assert_eq!(late.cell(2).unwrap().value, 99);
        assert_eq!(late.cell(2).unwrap().version_time, 6);
    }

    #[test]
    fn test_failure_window_disqualifies_replicated_copy() {
        let mut site = live_site(2);
        site.fail(3);
        site.recover();

        let snap = SiteSnapshot::capture(&site, 5).unwrap();
        assert!(!snap.can_serve(2, 5));
        // Non-replicated copy is readable as soon as the site is back
        assert!(snap.can_serve(1, 5));
        // A transaction that started before the failure still trusts the copy
        assert!(snap.can_serve(2, 2));
    }

    #[test]
    fn test_buffer_write_requires_up_copy() {
        let site = live_site(3);
        let mut snap = SiteSnapshot::capture(&site, 1).unwrap();
        assert!(!snap.buffer_write(1, 5));
        assert!(snap.buffer_write(4, 5));
        assert!(snap.cell(4).unwrap().buffered);
        assert!(snap.holds(1));

        snap.mark_down(2);
        assert!(!snap.buffer_write(6, 1));
        assert!(!snap.can_serve(4, 1));
    }
}
