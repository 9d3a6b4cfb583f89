//! Log replay
//!
//! Feeds a command log to a transaction manager one line at a time. Blank
//! and comment lines tick the clock. Malformed lines and refused commands
//! are reported to the sink and also tick the clock; the run continues.

use crate::parser::{parse_bytes, Line};
use ssi_engine::{
    ConfigError, EngineConfig, EngineError, Event, EventSink, TransactionManager,
    TransactionManagerApi,
};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Read error: {0}")]
    Read(#[source] io::Error),

    #[error("Output error: {0}")]
    Output(#[from] io::Error),

    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Counters for one replayed log
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Lines handed to the engine
    pub commands: usize,
    /// Blank and comment lines
    pub blank: usize,
    pub malformed: usize,
    pub refused: usize,
    pub committed: usize,
    pub aborted: usize,
}

/// Replay every line of `reader` against `manager`.
pub fn replay_log<R, M, S>(
    mut reader: R,
    manager: &mut M,
    sink: &mut S,
) -> Result<ReplaySummary, ReplayError>
where
    R: BufRead,
    M: TransactionManagerApi,
    S: EventSink + ?Sized,
{
    let mut summary = ReplaySummary::default();

    let mut raw = Vec::new();
    let mut line_no = 0;

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).map_err(ReplayError::Read)? == 0 {
            break;
        }
        line_no += 1;

        let command = match parse_bytes(&raw) {
            Ok(Line::Blank) => {
                manager.tick();
                summary.blank += 1;
                continue;
            }
            Ok(Line::Command(command)) => command,
            Err(e) => {
                manager.tick();
                summary.malformed += 1;
                warn!(line = line_no, error = %e, "Skipping malformed line");
                sink.notice(&EngineError::from(e).to_string())?;
                continue;
            }
        };

        sink.echo(String::from_utf8_lossy(&raw).trim())?;
        summary.commands += 1;

        match manager.execute(command) {
            Ok(events) => {
                for event in &events {
                    match event {
                        Event::Committed { .. } => summary.committed += 1,
                        Event::Aborted { .. } => summary.aborted += 1,
                        _ => {}
                    }
                    sink.emit(event)?;
                }
            }
            Err(e) => {
                summary.refused += 1;
                debug!(line = line_no, error = %e, "Command refused");
                sink.notice(&e.to_string())?;
            }
        }
    }

    Ok(summary)
}

/// Replay one log file against a fresh manager, framed as a run.
pub fn replay_file<S>(
    path: &Path,
    config: &EngineConfig,
    sink: &mut S,
) -> Result<ReplaySummary, ReplayError>
where
    S: EventSink + ?Sized,
{
    let file = File::open(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    replay_named(&name, BufReader::new(file), config, sink)
}

/// Replay a reader against a fresh manager, framed as a run called `name`.
pub fn replay_named<R, S>(
    name: &str,
    reader: R,
    config: &EngineConfig,
    sink: &mut S,
) -> Result<ReplaySummary, ReplayError>
where
    R: BufRead,
    S: EventSink + ?Sized,
{
    let mut manager = TransactionManager::with_config(config.clone())?;

    sink.start_run(name)?;
    let summary = replay_log(reader, &mut manager, sink)?;
    sink.end_run()?;
    sink.flush()?;

    info!(
        run = name,
        commands = summary.commands,
        committed = summary.committed,
        aborted = summary.aborted,
        refused = summary.refused,
        malformed = summary.malformed,
        "Replay finished"
    );
    Ok(summary)
}

/// Expand directories into their files, sorted by name. Files pass through.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ReplayError> {
    let mut inputs = Vec::new();

    for path in paths {
        if !path.is_dir() {
            inputs.push(path.clone());
            continue;
        }

        let entries = fs::read_dir(path).map_err(|source| ReplayError::Io {
            path: path.clone(),
            source,
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ReplayError::Io {
                path: path.clone(),
                source,
            })?;
            let file = entry.path();
            if file.is_file() {
                files.push(file);
            }
        }
        files.sort();
        inputs.extend(files);
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssi_engine::{MemorySink, TxnId};

    fn replay(log: &str) -> (ReplaySummary, TransactionManager, MemorySink) {
        replay_bytes(log.as_bytes())
    }

    fn replay_bytes(log: &[u8]) -> (ReplaySummary, TransactionManager, MemorySink) {
        let mut manager = TransactionManager::new();
        let mut sink = MemorySink::new();
        let summary = replay_log(log, &mut manager, &mut sink).unwrap();
        (summary, manager, sink)
    }

    #[test]
    fn test_blank_and_comment_lines_tick_clock() {
        let (summary, manager, _) = replay("begin(T1)\n\n// comment\nW(T1,x2,5)\n");
        assert_eq!(summary.commands, 2);
        assert_eq!(summary.blank, 2);
        assert_eq!(manager.now(), 4);
        assert_eq!(manager.transaction(&TxnId::from("T1")).unwrap().start_time(), 1);
    }

    #[test]
    fn test_bad_lines_reported_and_skipped() {
        let (summary, manager, sink) = replay("begin(T1)\nfrobnicate(T1)\nR(T9,x2)\nend(T1)\n");
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.refused, 1);
        assert_eq!(summary.committed, 1);
        assert_eq!(manager.now(), 4);

        let notices = &sink.runs()[0].notices;
        assert_eq!(notices.len(), 2);
        assert!(notices[0].starts_with("Unrecognized command"));
        assert_eq!(notices[1], "Transaction T9 is not active");
    }

    #[test]
    fn test_non_utf8_line_skipped() {
        let (summary, manager, sink) = replay_bytes(b"begin(T1)\nW(T1,x2,\xff)\nW(T1,x2,7)\nend(T1)\n");
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.commands, 3);
        assert_eq!(summary.committed, 1);
        assert_eq!(manager.now(), 4);
        assert_eq!(manager.last_commit(2), Some(4));

        let notices = &sink.runs()[0].notices;
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with("Line is not valid UTF-8"));
    }

    #[test]
    fn test_invalid_engine_config_rejected() {
        let config = EngineConfig {
            site_count: 0,
            ..EngineConfig::default()
        };
        let mut sink = MemorySink::new();
        let result = replay_named("empty", "".as_bytes(), &config, &mut sink);
        assert!(matches!(result, Err(ReplayError::Config(ConfigError::NoSites))));
    }
}
