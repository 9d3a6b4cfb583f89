//! # End-to-End Replay
//!
//! Random workloads rendered to text, parsed and replayed by the runtime,
//! must produce exactly what the engine produces when driven directly.

#[cfg(test)]
mod tests {
    use crate::workload::{generate, render, Workload};
    use ssi_engine::domain::invariants::{
        invariant_history_monotonic, invariant_no_dangerous_structure, invariant_replicas_agree,
    };
    use ssi_engine::{
        Command, EngineConfig, Event, MemorySink, TransactionManager, TransactionManagerApi,
        TxnId,
    };
    use ssi_runtime::{replay_named, JsonSink};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn run_direct(commands: &[Command]) -> (TransactionManager, Vec<Event>) {
        let mut manager = TransactionManager::new();
        let mut events = Vec::new();
        for command in commands {
            if let Ok(produced) = manager.execute(command.clone()) {
                events.extend(produced);
            }
        }
        (manager, events)
    }

    fn seeds() -> impl Iterator<Item = u64> {
        1..=16
    }

    // =============================================================================
    // TESTS
    // =============================================================================

    #[test]
    fn test_replay_matches_direct_execution() {
        for seed in seeds() {
            let workload = Workload {
                seed,
                ..Workload::default()
            };
            let commands = generate(&workload);

            let (_, direct) = run_direct(&commands);
            let mut sink = MemorySink::new();
            replay_named("generated", render(&commands).as_bytes(), &workload.engine, &mut sink)
                .unwrap();

            let replayed: Vec<Event> = sink.events().cloned().collect();
            assert_eq!(replayed, direct, "seed {seed}");
        }
    }

    #[test]
    fn test_invariants_hold_after_random_workloads() {
        for seed in seeds() {
            let commands = generate(&Workload {
                seed,
                commands: 400,
                failure_rate: 0.1,
                ..Workload::default()
            });
            let (manager, events) = run_direct(&commands);

            assert!(manager.sites().all(invariant_history_monotonic), "seed {seed}");
            assert!(invariant_replicas_agree(manager.sites()), "seed {seed}");
            assert!(invariant_no_dangerous_structure(manager.graph()), "seed {seed}");

            // Every commit stamps time strictly increasing
            let commit_times: Vec<u64> = events
                .iter()
                .filter_map(|event| match event {
                    Event::Committed { time, .. } => Some(*time),
                    _ => None,
                })
                .collect();
            assert!(commit_times.windows(2).all(|w| w[0] < w[1]), "seed {seed}");
        }
    }

    #[test]
    fn test_ending_everything_drains_live_state() {
        let workload = Workload {
            seed: 42,
            ..Workload::default()
        };
        let mut commands = generate(&workload);
        for site in 1..=workload.engine.site_count {
            commands.push(Command::Recover(site));
        }
        for n in 1..=workload.transactions {
            commands.push(Command::End(TxnId::new(format!("T{n}"))));
        }

        let (manager, _) = run_direct(&commands);
        assert_eq!(manager.live_transactions().count(), 0);
        assert!(manager.pending_reads().is_empty());
        assert!(manager.sites().all(|site| site.is_up()));
    }

    #[test]
    fn test_json_trace_is_deterministic() {
        let workload = Workload {
            seed: 3,
            ..Workload::default()
        };
        let log = render(&generate(&workload));

        let trace = || {
            let mut sink = JsonSink::new(Vec::new());
            replay_named("generated", log.as_bytes(), &EngineConfig::default(), &mut sink)
                .unwrap();
            String::from_utf8(sink.into_inner()).unwrap()
        };

        let first = trace();
        assert_eq!(first, trace());
        for line in first.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value["event"].is_string());
        }
    }
}
