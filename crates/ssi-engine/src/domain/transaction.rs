//! Transaction
//!
//! Owns a private snapshot of every site taken at its start time. Reads and
//! writes act on that snapshot only; nothing becomes visible to other
//! transactions until the manager merges a successful commit.

use super::errors::{AbortReason, EngineError};
use super::graph::{Edge, SerializationGraph};
use super::ledger::ConflictLedger;
use super::site::Site;
use super::snapshot::SiteSnapshot;
use super::value_objects::{is_replicated, SiteId, Timestamp, TxnId, Value, VariableId};
use crate::algorithms::{commit_edges, find_dangerous_cycle_through};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Result of a read request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Served from the snapshot copy at `site`
    Served { value: Value, site: SiteId },
    /// The transaction already wrote the variable
    OwnWrite { value: Value },
    /// Every holding site is down but one will be able to serve after recovery
    Deferred { site: SiteId },
    /// No site can ever serve the start-time version
    Unavailable,
}

/// Result of a write request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Buffered { sites: Vec<SiteId> },
    Unavailable,
}

/// Shared state a commit validates against
pub struct CommitContext<'a> {
    pub last_commits: &'a mut BTreeMap<VariableId, Timestamp>,
    pub ledger: &'a ConflictLedger,
    pub graph: &'a mut SerializationGraph,
}

/// What a successful commit hands back to the manager
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Buffered writes to merge into the live sites
    pub writes: BTreeMap<VariableId, Value>,
    /// Edges this commit added to the serialization graph
    pub edges: Vec<Edge>,
}

#[derive(Clone, Debug)]
pub struct Transaction {
    id: TxnId,
    start_time: Timestamp,
    read_only: bool,
    snapshot: BTreeMap<SiteId, SiteSnapshot>,
    read_set: BTreeSet<VariableId>,
    /// Writer of the version each served read observed
    observed: BTreeMap<VariableId, Option<TxnId>>,
    write_set: BTreeMap<VariableId, Value>,
    is_active: bool,
}

impl Transaction {
    /// Start a transaction with a snapshot of `sites` as of `start_time`.
    pub fn begin<'a>(
        id: TxnId,
        start_time: Timestamp,
        read_only: bool,
        sites: impl IntoIterator<Item = &'a Site>,
    ) -> Result<Self, EngineError> {
        let snapshot = sites
            .into_iter()
            .map(|site| SiteSnapshot::capture(site, start_time).map(|snap| (site.id(), snap)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            id,
            start_time,
            read_only,
            snapshot,
            read_set: BTreeSet::new(),
            observed: BTreeMap::new(),
            write_set: BTreeMap::new(),
            is_active: true,
        })
    }

    pub fn id(&self) -> &TxnId {
        &self.id
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn read_set(&self) -> &BTreeSet<VariableId> {
        &self.read_set
    }

    pub fn write_set(&self) -> &BTreeMap<VariableId, Value> {
        &self.write_set
    }

    pub fn snapshot_of(&self, site: SiteId) -> Option<&SiteSnapshot> {
        self.snapshot.get(&site)
    }

    /// Read `variable` from the snapshot.
    ///
    /// `live_sites` is consulted only to decide whether a read that no
    /// snapshot copy can serve may wait for a down site.
    pub fn read(
        &mut self,
        variable: VariableId,
        live_sites: &BTreeMap<SiteId, Site>,
    ) -> Result<ReadOutcome, EngineError> {
        if let Some(&value) = self.write_set.get(&variable) {
            return Ok(ReadOutcome::OwnWrite { value });
        }

        let served = self
            .snapshot
            .values()
            .find(|snap| snap.can_serve(variable, self.start_time))
            .and_then(|snap| snap.cell(variable).map(|cell| (snap.site(), cell.clone())));
        if let Some((site, cell)) = served {
            self.read_set.insert(variable);
            self.observed.insert(variable, cell.writer);
            return Ok(ReadOutcome::Served {
                value: cell.value,
                site,
            });
        }

        for site in live_sites.values().filter(|site| !site.is_up()) {
            let Some(var) = site.variable(variable) else {
                continue;
            };
            let version = var.version_at(self.start_time)?;
            if is_replicated(variable) && site.failed_between(version.commit_time, self.start_time)
            {
                continue;
            }
            self.read_set.insert(variable);
            return Ok(ReadOutcome::Deferred { site: site.id() });
        }

        Ok(ReadOutcome::Unavailable)
    }

    /// Buffer a write into every up snapshot copy holding `variable`.
    pub fn write(&mut self, variable: VariableId, value: Value) -> WriteOutcome {
        let sites: Vec<SiteId> = self
            .snapshot
            .values_mut()
            .filter_map(|snap| snap.buffer_write(variable, value).then(|| snap.site()))
            .collect();
        if sites.is_empty() {
            return WriteOutcome::Unavailable;
        }
        self.write_set.insert(variable, value);
        WriteOutcome::Buffered { sites }
    }

    /// Validate against the ledger and graph; on success stamp last-commit times.
    ///
    /// On any failure the transaction is aborted and every edge this attempt
    /// added is removed again.
    pub fn commit(
        &mut self,
        now: Timestamp,
        ctx: CommitContext<'_>,
    ) -> Result<CommitOutcome, AbortReason> {
        if self.read_only {
            self.is_active = false;
            return Ok(CommitOutcome::default());
        }

        for &variable in self.write_set.keys() {
            if let Some(&committed_at) = ctx.last_commits.get(&variable) {
                if committed_at > self.start_time {
                    self.abort();
                    return Err(AbortReason::WriteConflict {
                        variable,
                        committed_at,
                    });
                }
            }
        }

        let candidates = commit_edges(&self.id, self.write_set.keys(), &self.observed, now, ctx.ledger);
        let mut added: Vec<Edge> = Vec::new();
        for edge in candidates {
            if !ctx.graph.add_edge(edge.clone()) {
                continue;
            }
            debug!(from = %edge.from, to = %edge.to, kind = %edge.kind, "Added serialization edge");
            let found = find_dangerous_cycle_through(ctx.graph, &edge);
            added.push(edge);

            if let Some(cycle) = found {
                for edge in &added {
                    ctx.graph.remove_edge(&edge.from, &edge.to);
                }
                self.abort();
                return Err(AbortReason::SerializationCycle { cycle });
            }
        }

        for &variable in self.write_set.keys() {
            ctx.last_commits.insert(variable, now);
        }
        self.is_active = false;

        Ok(CommitOutcome {
            writes: self.write_set.clone(),
            edges: added,
        })
    }

    pub fn abort(&mut self) {
        self.is_active = false;
    }

    /// The site failed: the snapshot copy becomes unavailable.
    /// Returns true if the write set touches any variable the site holds.
    pub fn site_failed(&mut self, site: SiteId, time: Timestamp) -> bool {
        let Some(snap) = self.snapshot.get_mut(&site) else {
            return false;
        };
        snap.mark_down(time);
        self.write_set.keys().any(|&variable| snap.holds(variable))
    }

    /// Replace the snapshot copy of a recovered site, keeping start-time visibility.
    pub fn refresh_site(&mut self, site: &Site) -> Result<(), EngineError> {
        let snap = SiteSnapshot::capture(site, self.start_time)?;
        self.snapshot.insert(site.id(), snap);
        Ok(())
    }
}
