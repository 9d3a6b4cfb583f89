//! Commands accepted by the transaction manager, one per logical step.

use super::value_objects::{SiteId, TxnId, Value, VariableId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// `begin(Tn)`
    Begin(TxnId),
    /// `beginRO(Tn)`
    BeginReadOnly(TxnId),
    /// `R(Tn, xk)`
    Read(TxnId, VariableId),
    /// `W(Tn, xk, v)`
    Write(TxnId, VariableId, Value),
    /// `end(Tn)`
    End(TxnId),
    /// `fail(s)`
    Fail(SiteId),
    /// `recover(s)`
    Recover(SiteId),
    /// `dump()`
    Dump,
}

impl Command {
    pub fn begin(txn: &str) -> Self {
        Command::Begin(TxnId::from(txn))
    }

    pub fn begin_ro(txn: &str) -> Self {
        Command::BeginReadOnly(TxnId::from(txn))
    }

    pub fn read(txn: &str, variable: VariableId) -> Self {
        Command::Read(TxnId::from(txn), variable)
    }

    pub fn write(txn: &str, variable: VariableId, value: Value) -> Self {
        Command::Write(TxnId::from(txn), variable, value)
    }

    pub fn end(txn: &str) -> Self {
        Command::End(TxnId::from(txn))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Begin(txn) => write!(f, "begin({txn})"),
            Command::BeginReadOnly(txn) => write!(f, "beginRO({txn})"),
            Command::Read(txn, var) => write!(f, "R({txn},x{var})"),
            Command::Write(txn, var, value) => write!(f, "W({txn},x{var},{value})"),
            Command::End(txn) => write!(f, "end({txn})"),
            Command::Fail(site) => write!(f, "fail({site})"),
            Command::Recover(site) => write!(f, "recover({site})"),
            Command::Dump => write!(f, "dump()"),
        }
    }
}
