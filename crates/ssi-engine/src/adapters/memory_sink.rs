//! In-memory event sink

use crate::domain::events::Event;
use crate::ports::outbound::EventSink;
use std::io;

/// One replayed log as seen by the sink
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordedRun {
    pub name: String,
    pub events: Vec<Event>,
    pub notices: Vec<String>,
}

/// Collects every emitted event, grouped per replayed log
#[derive(Debug, Default)]
pub struct MemorySink {
    runs: Vec<RecordedRun>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events of all runs, in emission order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.runs.iter().flat_map(|run| run.events.iter())
    }

    pub fn runs(&self) -> &[RecordedRun] {
        &self.runs
    }

    /// Rendered lines of all runs
    pub fn lines(&self) -> Vec<String> {
        self.events().map(ToString::to_string).collect()
    }

    fn current(&mut self) -> &mut RecordedRun {
        if self.runs.is_empty() {
            self.runs.push(RecordedRun::default());
        }
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: &Event) -> io::Result<()> {
        self.current().events.push(event.clone());
        Ok(())
    }

    fn start_run(&mut self, name: &str) -> io::Result<()> {
        self.runs.push(RecordedRun {
            name: name.to_string(),
            ..RecordedRun::default()
        });
        Ok(())
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        self.current().notices.push(message.to_string());
        Ok(())
    }
}
