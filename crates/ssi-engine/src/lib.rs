//! # SSI Engine
//!
//! Replicated multiversion store with serializable snapshot isolation.
//! Transactions read from a private snapshot taken at their start, buffer
//! writes locally, and are validated at commit by first-committer-wins and a
//! serialization graph that rejects dangerous structures (two consecutive
//! read-write anti-dependencies on a cycle).
//!
//! ## Architecture
//!
//! - **Domain**: Variables, sites, snapshots, transactions, ledger, graph, events
//! - **Algorithms**: Dangerous-structure cycle detection, commit edge construction
//! - **Ports**: Inbound (TransactionManagerApi) and Outbound (EventSink)
//! - **Application**: Transaction manager
//! - **Adapters**: In-memory event sink
//!
//! ## Layout
//!
//! Even-indexed variables are replicated at every site; odd-indexed
//! variable `xi` lives only at site `(i mod site_count) + 1`.

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{MemorySink, RecordedRun};
pub use application::manager::{PendingRead, TransactionManager};
pub use config::EngineConfig;
pub use domain::command::Command;
pub use domain::errors::{AbortReason, ConfigError, EngineError};
pub use domain::events::Event;
pub use domain::value_objects::*;
pub use ports::inbound::TransactionManagerApi;
pub use ports::outbound::EventSink;
