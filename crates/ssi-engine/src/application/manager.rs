//! Transaction Manager
//!
//! Owns the logical clock, the live sites, the conflict ledger, the
//! serialization graph and the waiting queue. Every command runs to
//! completion in one step; nothing here blocks.

use crate::config::EngineConfig;
use crate::domain::command::Command;
use crate::domain::errors::{AbortReason, ConfigError, EngineError};
use crate::domain::events::Event;
use crate::domain::graph::SerializationGraph;
use crate::domain::ledger::ConflictLedger;
use crate::domain::site::Site;
use crate::domain::transaction::{CommitContext, ReadOutcome, Transaction, WriteOutcome};
use crate::domain::value_objects::{SiteId, Timestamp, TxnId, Value, VariableId};
use crate::ports::inbound::TransactionManagerApi;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// A read parked until `site` recovers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRead {
    pub txn: TxnId,
    pub variable: VariableId,
    pub site: SiteId,
}

/// Transaction Manager
///
/// Sequences commands against one logical clock:
/// 1. Advance the clock
/// 2. Route the command to the addressed transaction or site
/// 3. Keep the ledger, graph and waiting queue in step
/// 4. Report what happened as events
pub struct TransactionManager {
    config: EngineConfig,
    clock: Timestamp,
    sites: BTreeMap<SiteId, Site>,
    transactions: BTreeMap<TxnId, Transaction>,
    ledger: ConflictLedger,
    graph: SerializationGraph,
    last_commits: BTreeMap<VariableId, Timestamp>,
    waiting: Vec<PendingRead>,
}

impl TransactionManager {
    /// Create a manager with the default layout (10 sites, 20 variables)
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// Create a manager with a custom layout
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let sites = (1..=config.site_count)
            .map(|id| {
                let site = Site::new(
                    id,
                    config.site_count,
                    config.variable_count,
                    config.initial_value_scale,
                );
                (id, site)
            })
            .collect();

        Self {
            config,
            clock: 0,
            sites,
            transactions: BTreeMap::new(),
            ledger: ConflictLedger::new(),
            graph: SerializationGraph::new(),
            last_commits: BTreeMap::new(),
            waiting: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(&id)
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn transaction(&self, id: &TxnId) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    pub fn is_live(&self, id: &TxnId) -> bool {
        self.transactions.contains_key(id)
    }

    pub fn live_transactions(&self) -> impl Iterator<Item = &TxnId> {
        self.transactions.keys()
    }

    pub fn graph(&self) -> &SerializationGraph {
        &self.graph
    }

    pub fn ledger(&self) -> &ConflictLedger {
        &self.ledger
    }

    pub fn pending_reads(&self) -> &[PendingRead] {
        &self.waiting
    }

    /// Time of the most recent successful commit that wrote `variable`
    pub fn last_commit(&self, variable: VariableId) -> Option<Timestamp> {
        self.last_commits.get(&variable).copied()
    }

    fn check_variable(&self, variable: VariableId) -> Result<(), EngineError> {
        if variable == 0 || variable > self.config.variable_count {
            return Err(EngineError::VariableNotFound(variable));
        }
        Ok(())
    }

    fn live_mut(&mut self, id: &TxnId) -> Result<&mut Transaction, EngineError> {
        self.transactions
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownTransaction(id.clone()))
    }

    /// Drop a live transaction and its parked reads, reporting the abort.
    fn abort(&mut self, id: &TxnId, reason: AbortReason) -> Event {
        if let Some(mut txn) = self.transactions.remove(id) {
            txn.abort();
        }
        self.waiting.retain(|pending| &pending.txn != id);
        info!(txn = %id, time = self.clock, reason = %reason, "Transaction aborted");
        Event::Aborted {
            txn: id.clone(),
            reason,
        }
    }

    fn begin(&mut self, id: TxnId, read_only: bool) -> Result<Vec<Event>, EngineError> {
        if self.transactions.contains_key(&id) {
            return Err(EngineError::DuplicateTransaction(id));
        }

        let txn = Transaction::begin(id.clone(), self.clock, read_only, self.sites.values())?;
        debug!(txn = %id, time = self.clock, read_only, "Transaction started");
        self.transactions.insert(id.clone(), txn);

        Ok(vec![Event::Began {
            txn: id,
            time: self.clock,
            read_only,
        }])
    }

    fn read(&mut self, id: TxnId, variable: VariableId) -> Result<Vec<Event>, EngineError> {
        self.check_variable(variable)?;
        self.serve_read(id, variable)
    }

    /// Run a read against the transaction's snapshot and act on the outcome.
    /// Shared by fresh reads and by deferred reads drained on recovery.
    fn serve_read(&mut self, id: TxnId, variable: VariableId) -> Result<Vec<Event>, EngineError> {
        let now = self.clock;
        let sites = &self.sites;
        let txn = self
            .transactions
            .get_mut(&id)
            .ok_or_else(|| EngineError::UnknownTransaction(id.clone()))?;
        let read_only = txn.is_read_only();
        let outcome = txn.read(variable, sites)?;

        let event = match outcome {
            ReadOutcome::Served { value, site } => {
                if !read_only {
                    self.ledger.record_read(variable, &id, now);
                }
                Event::ReadServed {
                    txn: id,
                    variable,
                    value,
                    site,
                }
            }
            ReadOutcome::OwnWrite { value } => Event::ReadOwnWrite {
                txn: id,
                variable,
                value,
            },
            ReadOutcome::Deferred { site } => {
                debug!(txn = %id, variable, site, "Read parked until site recovers");
                self.waiting.push(PendingRead {
                    txn: id.clone(),
                    variable,
                    site,
                });
                Event::ReadDeferred {
                    txn: id,
                    variable,
                    site,
                }
            }
            ReadOutcome::Unavailable => self.abort(&id, AbortReason::ReadUnavailable { variable }),
        };

        Ok(vec![event])
    }

    fn write(
        &mut self,
        id: TxnId,
        variable: VariableId,
        value: Value,
    ) -> Result<Vec<Event>, EngineError> {
        self.check_variable(variable)?;
        let now = self.clock;
        let txn = self.live_mut(&id)?;
        if txn.is_read_only() {
            return Err(EngineError::ReadOnlyWrite(id, variable));
        }

        let event = match txn.write(variable, value) {
            WriteOutcome::Buffered { sites } => {
                self.ledger.record_write(variable, &id, now);
                Event::WriteBuffered {
                    txn: id,
                    variable,
                    value,
                    sites,
                }
            }
            WriteOutcome::Unavailable => self.abort(&id, AbortReason::WriteUnavailable { variable }),
        };

        Ok(vec![event])
    }

    fn end(&mut self, id: TxnId) -> Result<Vec<Event>, EngineError> {
        let mut txn = self
            .transactions
            .remove(&id)
            .ok_or_else(|| EngineError::UnknownTransaction(id.clone()))?;
        self.waiting.retain(|pending| pending.txn != id);

        let now = self.clock;
        let result = txn.commit(
            now,
            CommitContext {
                last_commits: &mut self.last_commits,
                ledger: &self.ledger,
                graph: &mut self.graph,
            },
        );

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(reason) => {
                info!(txn = %id, time = now, reason = %reason, "Transaction aborted");
                return Ok(vec![Event::Aborted { txn: id, reason }]);
            }
        };

        for (&variable, &value) in &outcome.writes {
            for site in self.sites.values_mut() {
                if site.is_up() && site.holds(variable) {
                    site.commit(variable, value, now, Some(id.clone()))?;
                }
            }
        }
        info!(
            txn = %id,
            time = now,
            writes = outcome.writes.len(),
            edges = outcome.edges.len(),
            "Transaction committed"
        );

        let mut events: Vec<Event> = outcome
            .edges
            .into_iter()
            .map(|edge| Event::EdgeAdded { edge })
            .collect();
        events.push(Event::Committed { txn: id, time: now });
        Ok(events)
    }

    fn fail(&mut self, site_id: SiteId) -> Result<Vec<Event>, EngineError> {
        let now = self.clock;
        let site = self
            .sites
            .get_mut(&site_id)
            .ok_or(EngineError::SiteNotFound(site_id))?;
        if !site.is_up() {
            return Err(EngineError::SiteAlreadyDown(site_id));
        }
        site.fail(now);
        warn!(site = site_id, time = now, "Site failed");

        let doomed: Vec<TxnId> = self
            .transactions
            .values_mut()
            .filter_map(|txn| {
                let touches_site = txn.site_failed(site_id, now);
                (touches_site && !txn.is_read_only()).then(|| txn.id().clone())
            })
            .collect();

        let mut events = vec![Event::SiteFailed {
            site: site_id,
            time: now,
        }];
        for id in doomed {
            events.push(self.abort(&id, AbortReason::SiteFailure { site: site_id }));
        }
        Ok(events)
    }

    fn recover(&mut self, site_id: SiteId) -> Result<Vec<Event>, EngineError> {
        let site = self
            .sites
            .get_mut(&site_id)
            .ok_or(EngineError::SiteNotFound(site_id))?;
        if site.is_up() {
            return Err(EngineError::SiteAlreadyUp(site_id));
        }
        site.recover();
        let stale = site.stale_copies();
        info!(site = site_id, stale = stale.len(), "Site recovered");

        let site: &Site = site;
        for txn in self.transactions.values_mut() {
            txn.refresh_site(site)?;
        }
        debug!(site = site_id, refreshed = self.transactions.len(), "Refreshed snapshot copies");

        let mut events = vec![Event::SiteRecovered {
            site: site_id,
            stale,
        }];

        let (ready, still_waiting): (Vec<PendingRead>, Vec<PendingRead>) = self
            .waiting
            .drain(..)
            .partition(|pending| pending.site == site_id);
        self.waiting = still_waiting;
        debug!(site = site_id, drained = ready.len(), "Replaying deferred reads");

        for pending in ready {
            if !self.transactions.contains_key(&pending.txn) {
                continue;
            }
            events.extend(self.serve_read(pending.txn, pending.variable)?);
        }
        Ok(events)
    }

    fn dump(&self) -> Vec<Event> {
        vec![Event::Dump {
            sites: self.sites.values().map(Site::dump).collect(),
        }]
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionManagerApi for TransactionManager {
    fn execute(&mut self, command: Command) -> Result<Vec<Event>, EngineError> {
        self.clock += 1;
        debug!(time = self.clock, command = %command, "Executing command");

        match command {
            Command::Begin(id) => self.begin(id, false),
            Command::BeginReadOnly(id) => self.begin(id, true),
            Command::Read(id, variable) => self.read(id, variable),
            Command::Write(id, variable, value) => self.write(id, variable, value),
            Command::End(id) => self.end(id),
            Command::Fail(site) => self.fail(site),
            Command::Recover(site) => self.recover(site),
            Command::Dump => Ok(self.dump()),
        }
    }

    fn tick(&mut self) {
        self.clock += 1;
    }

    fn now(&self) -> Timestamp {
        self.clock
    }
}
