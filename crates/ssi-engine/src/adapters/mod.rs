//! Adapters for the SSI engine ports

pub mod memory_sink;

pub use memory_sink::{MemorySink, RecordedRun};
