//! Application layer for the SSI engine

pub mod manager;

pub use manager::{PendingRead, TransactionManager};
