//! # Integration Flows
//!
//! Engine and runtime exercised together through rendered command logs.

pub mod e2e_replay;
pub mod failure_recovery;
