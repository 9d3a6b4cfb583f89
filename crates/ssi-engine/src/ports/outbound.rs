//! Outbound Ports (Driven Ports / SPI)

use crate::domain::events::Event;
use std::io;

/// Destination for the event trace of one or more replayed logs
pub trait EventSink {
    fn emit(&mut self, event: &Event) -> io::Result<()>;

    /// A new log starts replaying against a fresh manager
    fn start_run(&mut self, _name: &str) -> io::Result<()> {
        Ok(())
    }

    /// The raw command line about to execute
    fn echo(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }

    /// A refused command or malformed line; the run continues
    fn notice(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }

    fn end_run(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &Event) -> io::Result<()> {
        (**self).emit(event)
    }

    fn start_run(&mut self, name: &str) -> io::Result<()> {
        (**self).start_run(name)
    }

    fn echo(&mut self, line: &str) -> io::Result<()> {
        (**self).echo(line)
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        (**self).notice(message)
    }

    fn end_run(&mut self) -> io::Result<()> {
        (**self).end_run()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
