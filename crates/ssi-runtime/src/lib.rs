//! # SSI Runtime
//!
//! I/O around the engine: log parsing, replay, trace output and
//! configuration for the `ssi-sim` binary.
//!
//! ## Modules
//!
//! - `parser` - One log line into a command
//! - `replay` - Drives a transaction manager over logs
//! - `output` - Text and JSON event sinks
//! - `config` - Defaults, environment and CLI overrides

pub mod config;
pub mod output;
pub mod parser;
pub mod replay;

pub use config::{OutputFormat, RuntimeConfig};
pub use output::{JsonSink, TextSink};
pub use parser::{parse_line, Line, ParseError};
pub use replay::{collect_inputs, replay_file, replay_log, replay_named, ReplayError, ReplaySummary};
