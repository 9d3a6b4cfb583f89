//! Conflict Ledger
//!
//! Chronological record of which transactions read or wrote each variable.
//! Feeds edge construction at commit time. Entries outlive their
//! transactions; they describe history, not live state.

use super::value_objects::{Access, Timestamp, TxnId, VariableId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConflictLedger {
    reads: BTreeMap<VariableId, Vec<Access>>,
    writes: BTreeMap<VariableId, Vec<Access>>,
}

impl ConflictLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read. Only the first read per (variable, transaction) is kept.
    pub fn record_read(&mut self, variable: VariableId, txn: &TxnId, time: Timestamp) -> bool {
        Self::record(&mut self.reads, variable, txn, time)
    }

    /// Record a write. Only the first write per (variable, transaction) is kept.
    pub fn record_write(&mut self, variable: VariableId, txn: &TxnId, time: Timestamp) -> bool {
        Self::record(&mut self.writes, variable, txn, time)
    }

    pub fn reads_of(&self, variable: VariableId) -> &[Access] {
        self.reads.get(&variable).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn writes_of(&self, variable: VariableId) -> &[Access] {
        self.writes.get(&variable).map(Vec::as_slice).unwrap_or(&[])
    }

    fn record(
        entries: &mut BTreeMap<VariableId, Vec<Access>>,
        variable: VariableId,
        txn: &TxnId,
        time: Timestamp,
    ) -> bool {
        let list = entries.entry(variable).or_default();
        if list.iter().any(|access| &access.txn == txn) {
            return false;
        }
        list.push(Access {
            txn: txn.clone(),
            time,
        });
        true
    }
}
