//! Seeded random workloads
//!
//! Generates command logs shaped like hand-written test inputs: a pool of
//! transaction ids that begin, read, write and end, with occasional site
//! failures, recoveries and dumps.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ssi_engine::{Command, EngineConfig, TxnId};

#[derive(Clone, Debug)]
pub struct Workload {
    pub seed: u64,
    pub commands: usize,
    /// Size of the transaction id pool
    pub transactions: u32,
    /// Chance that a command is a fail or recover
    pub failure_rate: f64,
    pub engine: EngineConfig,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            seed: 7,
            commands: 200,
            transactions: 8,
            failure_rate: 0.05,
            engine: EngineConfig::default(),
        }
    }
}

/// Generate a command sequence. The same workload always yields the same log.
pub fn generate(workload: &Workload) -> Vec<Command> {
    let mut rng = StdRng::seed_from_u64(workload.seed);
    let mut commands = Vec::with_capacity(workload.commands);
    let sites = workload.engine.site_count;
    let variables = workload.engine.variable_count;

    while commands.len() < workload.commands {
        if rng.gen_bool(workload.failure_rate) {
            let site = rng.gen_range(1..=sites);
            commands.push(if rng.gen_bool(0.5) {
                Command::Fail(site)
            } else {
                Command::Recover(site)
            });
            continue;
        }

        let txn = TxnId::new(format!("T{}", rng.gen_range(1..=workload.transactions)));
        let variable = rng.gen_range(1..=variables);
        let command = match rng.gen_range(0..100) {
            0..=14 => Command::Begin(txn),
            15..=17 => Command::BeginReadOnly(txn),
            18..=49 => Command::Read(txn, variable),
            50..=79 => Command::Write(txn, variable, rng.gen_range(-1000..1000)),
            80..=97 => Command::End(txn),
            _ => Command::Dump,
        };
        commands.push(command);
    }

    commands
}

/// Render commands as a log file, one per line
pub fn render(commands: &[Command]) -> String {
    let mut log = String::new();
    for command in commands {
        log.push_str(&command.to_string());
        log.push('\n');
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_log() {
        let workload = Workload::default();
        assert_eq!(generate(&workload), generate(&workload));
        assert_eq!(generate(&workload).len(), workload.commands);
    }

    #[test]
    fn test_rendered_log_parses_back() {
        let commands = generate(&Workload::default());
        let log = render(&commands);
        for (line, command) in log.lines().zip(&commands) {
            assert_eq!(
                ssi_runtime::parse_line(line).unwrap(),
                ssi_runtime::Line::Command(command.clone())
            );
        }
    }
}
