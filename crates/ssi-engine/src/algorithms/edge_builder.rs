//! Edge Builder
//!
//! Derives the serialization graph edges a committing transaction
//! contributes, from the conflict ledger and the versions it observed.

use crate::domain::graph::Edge;
use crate::domain::ledger::ConflictLedger;
use crate::domain::value_objects::{EdgeKind, Timestamp, TxnId, VariableId};
use std::collections::BTreeMap;

/// Candidate edges for `committer`, in insertion order.
///
/// For each written variable:
/// - an earlier writer gets a WW edge to the committer,
/// - an earlier reader gets an RW edge to the committer.
///
/// For each variable read, the writer of the observed version gets a WR
/// edge to the committer.
///
/// Duplicates are left in; the graph keeps one edge per ordered pair.
pub fn commit_edges<'a>(
    committer: &TxnId,
    written: impl IntoIterator<Item = &'a VariableId>,
    observed: &BTreeMap<VariableId, Option<TxnId>>,
    now: Timestamp,
    ledger: &ConflictLedger,
) -> Vec<Edge> {
    let mut edges = Vec::new();

    for &var in written {
        for access in ledger.writes_of(var) {
            if &access.txn != committer && access.time < now {
                edges.push(Edge::new(
                    access.txn.clone(),
                    committer.clone(),
                    EdgeKind::WriteWrite,
                ));
            }
        }
        for access in ledger.reads_of(var) {
            if &access.txn != committer && access.time < now {
                edges.push(Edge::new(
                    access.txn.clone(),
                    committer.clone(),
                    EdgeKind::ReadWrite,
                ));
            }
        }
    }

    for writer in observed.values().flatten() {
        if writer != committer {
            edges.push(Edge::new(
                writer.clone(),
                committer.clone(),
                EdgeKind::WriteRead,
            ));
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: &str) -> TxnId {
        TxnId::from(id)
    }

    #[test]
    fn test_ww_and_rw_edges_for_written_variable() {
        let mut ledger = ConflictLedger::new();
        ledger.record_write(2, &t("T1"), 2);
        ledger.record_read(2, &t("T3"), 3);
        ledger.record_write(2, &t("T2"), 4);

        let edges = commit_edges(&t("T2"), &[2], &BTreeMap::new(), 6, &ledger);

        assert_eq!(
            edges,
            vec![
                Edge::new(t("T1"), t("T2"), EdgeKind::WriteWrite),
                Edge::new(t("T3"), t("T2"), EdgeKind::ReadWrite),
            ]
        );
    }

    #[test]
    fn test_accesses_at_current_time_are_ignored() {
        let mut ledger = ConflictLedger::new();
        ledger.record_read(4, &t("T1"), 6);

        let edges = commit_edges(&t("T2"), &[4], &BTreeMap::new(), 6, &ledger);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_wr_edge_from_observed_writer() {
        let ledger = ConflictLedger::new();
        let mut observed = BTreeMap::new();
        observed.insert(2, Some(t("T1")));
        observed.insert(4, None);

        let edges = commit_edges(&t("T2"), &[], &observed, 9, &ledger);
        assert_eq!(edges, vec![Edge::new(t("T1"), t("T2"), EdgeKind::WriteRead)]);
    }
}
