//! # SSI Simulator Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── workload.rs       # Seeded random command logs
//! └── integration/      # Engine + runtime end-to-end flows
//! tests/benches/
//! └── engine_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ssi-tests
//! cargo test -p ssi-tests integration::
//! cargo bench -p ssi-tests
//! ```

pub mod integration;
pub mod workload;
