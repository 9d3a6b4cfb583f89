//! Value objects for the SSI engine
//!
//! Identifiers, logical time, conflict edge kinds and the replication rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type aliases for clarity
pub type SiteId = u32;
pub type VariableId = u32;
pub type Timestamp = u64;
pub type Value = i64;

/// Transaction identifier as it appears in the command log (`T1`, `T12`, ...)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnId(String);

impl TxnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxnId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Conflict kind carried by a serialization graph edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Both transactions wrote the same variable
    #[serde(rename = "WW")]
    WriteWrite,
    /// The target observed a value the source wrote
    #[serde(rename = "WR")]
    WriteRead,
    /// Anti-dependency: the source read a version the target overwrote
    #[serde(rename = "RW")]
    ReadWrite,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EdgeKind::WriteWrite => "WW",
            EdgeKind::WriteRead => "WR",
            EdgeKind::ReadWrite => "RW",
        };
        f.write_str(tag)
    }
}

/// One committed version of a variable
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub commit_time: Timestamp,
    pub value: Value,
    /// Writer of this version; `None` for the seed version at time 0
    pub writer: Option<TxnId>,
}

impl Version {
    pub fn seed(value: Value) -> Self {
        Self {
            commit_time: 0,
            value,
            writer: None,
        }
    }
}

/// A read or write recorded in the conflict ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub txn: TxnId,
    pub time: Timestamp,
}

/// Even variables are replicated at every site.
pub fn is_replicated(variable: VariableId) -> bool {
    variable % 2 == 0
}

/// Replication rule: `x_i` lives at site `s` iff `i` is even or `(i mod n) + 1 == s`.
pub fn resides_at(variable: VariableId, site: SiteId, site_count: u32) -> bool {
    is_replicated(variable) || (site_count > 0 && variable % site_count + 1 == site)
}

/// Sites holding a variable, ascending.
pub fn home_sites(variable: VariableId, site_count: u32) -> Vec<SiteId> {
    (1..=site_count)
        .filter(|&site| resides_at(variable, site, site_count))
        .collect()
}
