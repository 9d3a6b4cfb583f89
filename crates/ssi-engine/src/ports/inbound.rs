//! Inbound Ports (Driving Ports / API)

use crate::domain::command::Command;
use crate::domain::errors::EngineError;
use crate::domain::events::Event;
use crate::domain::value_objects::Timestamp;

/// Primary transaction manager API
///
/// A concurrency-control strategy is plugged in by implementing this trait;
/// log replay only ever talks to it through these three calls.
pub trait TransactionManagerApi {
    /// Advance the logical clock and execute one command at the new time.
    ///
    /// Aborts are reported as `Event::Aborted`, not as errors. An `Err` means
    /// the command was refused and had no effect beyond the clock tick.
    fn execute(&mut self, command: Command) -> Result<Vec<Event>, EngineError>;

    /// Advance the logical clock without executing anything (blank or comment line).
    fn tick(&mut self);

    /// Current logical time
    fn now(&self) -> Timestamp;
}
