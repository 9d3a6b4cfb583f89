//! Event sinks writing the trace to a stream

use serde_json::json;
use ssi_engine::{Event, EventSink};
use std::io::{self, Write};

const DIVIDER_WIDTH: usize = 80;

/// Human-readable trace: command echo, one line per event, divider per log
pub struct TextSink<W: Write> {
    out: W,
    verbose: bool,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for TextSink<W> {
    fn emit(&mut self, event: &Event) -> io::Result<()> {
        if event.is_verbose() && !self.verbose {
            return Ok(());
        }
        writeln!(self.out, "{event}")
    }

    fn start_run(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "Processing {name}")
    }

    fn echo(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "> {line}")
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    fn end_run(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(DIVIDER_WIDTH))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// One JSON object per line. Every event is written, edges included.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_value(&mut self, value: &serde_json::Value) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)
    }
}

impl<W: Write> EventSink for JsonSink<W> {
    fn emit(&mut self, event: &Event) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)
    }

    fn start_run(&mut self, name: &str) -> io::Result<()> {
        self.write_value(&json!({ "event": "run_started", "name": name }))
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        self.write_value(&json!({ "event": "notice", "message": message }))
    }

    fn end_run(&mut self) -> io::Result<()> {
        self.write_value(&json!({ "event": "run_finished" }))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
