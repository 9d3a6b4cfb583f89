//! Ports module for the SSI engine
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::TransactionManagerApi;
pub use outbound::EventSink;
