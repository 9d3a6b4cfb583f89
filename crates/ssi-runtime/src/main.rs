//! # SSI Simulator
//!
//! Replays command logs against a replicated multiversion store running
//! serializable snapshot isolation and prints the event trace.
//!
//! ```text
//! ssi-sim inputs/              # every file in the directory, sorted
//! ssi-sim test1.txt test2.txt  # each log against a fresh manager
//! ssi-sim < test1.txt          # stdin
//! ```

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ssi_engine::EventSink;
use ssi_runtime::{
    collect_inputs, replay_file, replay_named, JsonSink, OutputFormat, RuntimeConfig, TextSink,
};

/// Replicated multiversion store simulator with serializable snapshot isolation
#[derive(Parser, Debug)]
#[command(name = "ssi-sim")]
#[command(about = "Replay transaction logs against an SSI multiversion store")]
struct Args {
    /// Log files or directories of logs (reads stdin when omitted)
    inputs: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Log filter for diagnostics on stderr (e.g. "debug", "ssi_engine=debug")
    #[arg(long)]
    log: Option<String>,

    /// Show serialization graph edges in the text trace
    #[arg(short, long)]
    verbose: bool,

    /// Number of sites
    #[arg(long)]
    sites: Option<u32>,

    /// Number of variables
    #[arg(long)]
    variables: Option<u32>,
}

fn load_config(args: Args) -> RuntimeConfig {
    let mut config = RuntimeConfig::from_env();

    config.inputs = args.inputs;
    config.verbose = args.verbose;
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(log) = args.log {
        config.log = log;
    }
    if let Some(sites) = args.sites {
        config.engine.site_count = sites;
    }
    if let Some(variables) = args.variables {
        config.engine.variable_count = variables;
    }

    config
}

fn run(config: &RuntimeConfig, sink: &mut dyn EventSink) -> Result<()> {
    if config.inputs.is_empty() {
        let stdin = io::stdin();
        replay_named("stdin", stdin.lock(), &config.engine, sink)
            .context("Failed to replay stdin")?;
        return Ok(());
    }

    let files = collect_inputs(&config.inputs).context("Failed to list inputs")?;
    info!(files = files.len(), "Replaying logs");
    for file in &files {
        replay_file(file, &config.engine, sink)
            .with_context(|| format!("Failed to replay {}", file.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(Args::parse());

    // Diagnostics go to stderr so the trace on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log))
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    config
        .engine
        .validate()
        .context("Invalid engine configuration")?;

    // Replay is synchronous and may block on stdin
    tokio::task::spawn_blocking(move || {
        let stdout = io::stdout();
        let out = BufWriter::new(stdout.lock());
        match config.format {
            OutputFormat::Text => run(&config, &mut TextSink::new(out, config.verbose)),
            OutputFormat::Json => run(&config, &mut JsonSink::new(out)),
        }
    })
    .await
    .context("Replay task panicked")?
}
