//! Algorithms module for the SSI engine
//!
//! Contains:
//! - Dangerous-structure cycle detection
//! - Commit-time edge construction

pub mod cycle_detector;
pub mod edge_builder;

pub use cycle_detector::{find_any_cycle, find_dangerous_cycle, find_dangerous_cycle_through, Cycle};
pub use edge_builder::commit_edges;
