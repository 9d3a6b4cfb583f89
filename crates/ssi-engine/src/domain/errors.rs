//! Error types for the SSI engine
//!
//! `EngineError` is returned for requests the manager refuses; the run always
//! continues. `AbortReason` is not an error path: it travels inside an
//! `Event::Aborted` and only ends the offending transaction.

use super::value_objects::{EdgeKind, SiteId, Timestamp, TxnId, VariableId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Requests the transaction manager refuses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `begin` for an identifier that is still live
    #[error("Transaction {0} already exists")]
    DuplicateTransaction(TxnId),

    /// Read/write/end against an identifier that is not live
    #[error("Transaction {0} is not active")]
    UnknownTransaction(TxnId),

    /// Site id outside `1..=site_count`
    #[error("Site {0} does not exist")]
    SiteNotFound(SiteId),

    /// `fail` against a site that is already down
    #[error("Site {0} is already down")]
    SiteAlreadyDown(SiteId),

    /// `recover` against a site that is up
    #[error("Site {0} is already up")]
    SiteAlreadyUp(SiteId),

    /// Variable id outside `1..=variable_count`
    #[error("Variable x{0} does not exist")]
    VariableNotFound(VariableId),

    /// `W` issued by a read-only transaction
    #[error("Read-only transaction {0} cannot write x{1}")]
    ReadOnlyWrite(TxnId, VariableId),

    /// No committed version at or before the requested time
    #[error("No visible version of x{variable} at time {time}")]
    NoVisibleVersion { variable: VariableId, time: Timestamp },

    /// Malformed log line; carries the parser's description
    #[error("{0}")]
    InvalidCommand(String),
}

/// Why a transaction was aborted
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AbortReason {
    /// Every site holding the variable failed between its last commit and our start
    #[error("x{variable} is not available at any site")]
    ReadUnavailable { variable: VariableId },

    /// No up site could take a buffered write
    #[error("no available site accepts writes to x{variable}")]
    WriteUnavailable { variable: VariableId },

    /// First-committer-wins: another transaction committed the variable after we started
    #[error("x{variable} was committed at time {committed_at} by another transaction")]
    WriteConflict {
        variable: VariableId,
        committed_at: Timestamp,
    },

    /// Committing would close a cycle with two consecutive anti-dependencies
    #[error("dangerous structure in serialization graph: {}", format_cycle(.cycle))]
    SerializationCycle { cycle: Vec<(TxnId, EdgeKind)> },

    /// A site holding one of our buffered writes failed
    #[error("site {site} failed while holding uncommitted writes")]
    SiteFailure { site: SiteId },
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("site_count must be at least 1")]
    NoSites,

    #[error("variable_count must be at least 1")]
    NoVariables,
}

/// Render `[(T1, RW), (T2, RW)]` as `T1 -RW-> T2 -RW-> T1`.
fn format_cycle(cycle: &[(TxnId, EdgeKind)]) -> String {
    let Some((first, _)) = cycle.first() else {
        return String::new();
    };
    let mut out = String::new();
    for (txn, kind) in cycle {
        out.push_str(&format!("{txn} -{kind}-> "));
    }
    out.push_str(first.as_str());
    out
}
