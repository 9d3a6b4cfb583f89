//! Domain module for the SSI engine
//!
//! Contains the multiversion store, sites, transactions, the conflict
//! ledger, the serialization graph, events, errors and invariants.

pub mod command;
pub mod errors;
pub mod events;
pub mod graph;
pub mod invariants;
pub mod ledger;
pub mod site;
pub mod snapshot;
pub mod transaction;
pub mod value_objects;
pub mod variable;

pub use command::Command;
pub use errors::*;
pub use events::Event;
pub use graph::{Edge, SerializationGraph};
pub use ledger::ConflictLedger;
pub use site::{Site, SiteDump};
pub use snapshot::{SiteSnapshot, SnapshotCell};
pub use transaction::{CommitContext, CommitOutcome, ReadOutcome, Transaction, WriteOutcome};
pub use value_objects::*;
pub use variable::Variable;
