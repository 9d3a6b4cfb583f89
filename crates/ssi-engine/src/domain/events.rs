//! Trace events emitted by the transaction manager
//!
//! Each event renders as one human-readable line (a dump renders one line
//! per site) and serializes as a tagged JSON object.

use super::errors::AbortReason;
use super::graph::Edge;
use super::site::SiteDump;
use super::value_objects::{SiteId, Timestamp, TxnId, Value, VariableId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Began {
        txn: TxnId,
        time: Timestamp,
        read_only: bool,
    },
    ReadServed {
        txn: TxnId,
        variable: VariableId,
        value: Value,
        site: SiteId,
    },
    ReadOwnWrite {
        txn: TxnId,
        variable: VariableId,
        value: Value,
    },
    ReadDeferred {
        txn: TxnId,
        variable: VariableId,
        site: SiteId,
    },
    WriteBuffered {
        txn: TxnId,
        variable: VariableId,
        value: Value,
        sites: Vec<SiteId>,
    },
    EdgeAdded {
        edge: Edge,
    },
    Committed {
        txn: TxnId,
        time: Timestamp,
    },
    Aborted {
        txn: TxnId,
        reason: AbortReason,
    },
    SiteFailed {
        site: SiteId,
        time: Timestamp,
    },
    SiteRecovered {
        site: SiteId,
        stale: Vec<VariableId>,
    },
    Dump {
        sites: Vec<SiteDump>,
    },
}

impl Event {
    /// Diagnostic events hidden from the default trace
    pub fn is_verbose(&self) -> bool {
        matches!(self, Event::EdgeAdded { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Began {
                txn,
                time,
                read_only,
            } => {
                let kind = if *read_only { "read-only " } else { "" };
                write!(f, "{txn} begins {kind}at time {time}")
            }
            Event::ReadServed {
                txn,
                variable,
                value,
                site,
            } => write!(f, "{txn} reads x{variable} = {value} at site {site}"),
            Event::ReadOwnWrite {
                txn,
                variable,
                value,
            } => write!(f, "{txn} reads x{variable} = {value} from its own write"),
            Event::ReadDeferred {
                txn,
                variable,
                site,
            } => write!(
                f,
                "{txn} will read x{variable} at site {site} after site recovers"
            ),
            Event::WriteBuffered {
                txn,
                variable,
                value,
                sites,
            } => {
                let sites: Vec<String> = sites.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "{txn} writes x{variable} = {value} in local snapshot at sites {}",
                    sites.join(", ")
                )
            }
            Event::EdgeAdded { edge } => {
                write!(f, "Added {} edge from {} to {}", edge.kind, edge.from, edge.to)
            }
            Event::Committed { txn, time } => write!(f, "{txn} commits at time {time}"),
            Event::Aborted { txn, reason } => write!(f, "{txn} aborts: {reason}"),
            Event::SiteFailed { site, time } => write!(f, "site {site} fails at time {time}"),
            Event::SiteRecovered { site, stale } => {
                write!(f, "site {site} recovers")?;
                if !stale.is_empty() {
                    write!(f, " ({} replicated copies await a fresh commit)", stale.len())?;
                }
                Ok(())
            }
            Event::Dump { sites } => {
                for (i, site) in sites.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{site}")?;
                }
                Ok(())
            }
        }
    }
}
