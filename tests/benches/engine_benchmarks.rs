//! # SSI Engine Benchmarks
//!
//! | Area | Operation | Scaling |
//! |------|-----------|---------|
//! | Replay | Random workload through parser and manager | O(commands) |
//! | Cycle detection | Dangerous-structure search | O(V + E) |
//! | Commit | Edge construction against a busy ledger | O(accesses) |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use ssi_engine::algorithms::{commit_edges, find_dangerous_cycle};
use ssi_engine::domain::graph::{Edge, SerializationGraph};
use ssi_engine::domain::ledger::ConflictLedger;
use ssi_engine::{
    EdgeKind, EngineConfig, MemorySink, TransactionManager, TransactionManagerApi, TxnId,
};
use ssi_runtime::replay_named;
use ssi_tests::workload::{generate, render, Workload};
use std::collections::BTreeMap;
use std::time::Duration;

// ============================================================================
// Replay throughput
// ============================================================================

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    group.measurement_time(Duration::from_secs(10));

    for size in [100, 1_000, 10_000] {
        let workload = Workload {
            commands: size,
            transactions: 16,
            ..Workload::default()
        };
        let commands = generate(&workload);
        let log = render(&commands);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("parse_and_replay", size), &log, |b, log| {
            b.iter(|| {
                let mut sink = MemorySink::new();
                replay_named("bench", log.as_bytes(), &EngineConfig::default(), &mut sink)
                    .unwrap();
                black_box(sink.runs().len())
            })
        });
        group.bench_with_input(BenchmarkId::new("execute_only", size), &commands, |b, commands| {
            b.iter(|| {
                let mut manager = TransactionManager::new();
                for command in commands {
                    let _ = black_box(manager.execute(command.clone()));
                }
                black_box(manager.now())
            })
        });
    }

    group.finish();
}

// ============================================================================
// Cycle detection
// ============================================================================

fn random_graph(nodes: usize, edges: usize) -> SerializationGraph {
    let mut rng = rand::thread_rng();
    let mut graph = SerializationGraph::new();
    let kinds = [EdgeKind::WriteWrite, EdgeKind::WriteRead, EdgeKind::ReadWrite];

    // Forward edges only keep the graph acyclic, the worst case for the search
    while graph.edge_count() < edges {
        let from = rng.gen_range(0..nodes - 1);
        let to = rng.gen_range(from + 1..nodes);
        let kind = kinds[rng.gen_range(0..kinds.len())];
        graph.add_edge(Edge::new(
            TxnId::new(format!("T{from}")),
            TxnId::new(format!("T{to}")),
            kind,
        ));
    }
    graph
}

fn bench_cycle_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_detection");

    for nodes in [16, 64, 256] {
        let graph = random_graph(nodes, nodes * 3);
        group.bench_with_input(BenchmarkId::new("acyclic", nodes), &graph, |b, graph| {
            b.iter(|| black_box(find_dangerous_cycle(graph)))
        });
    }

    group.finish();
}

// ============================================================================
// Commit edge construction
// ============================================================================

fn bench_commit_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit_edges");

    for readers in [10, 100, 1_000] {
        let mut ledger = ConflictLedger::new();
        for n in 0..readers {
            let txn = TxnId::new(format!("T{n}"));
            ledger.record_read(2, &txn, n as u64);
            ledger.record_write(4, &txn, n as u64);
        }
        let committer = TxnId::from("TC");
        let written = [2u32, 4];
        let observed = BTreeMap::new();

        group.throughput(Throughput::Elements(readers as u64));
        group.bench_with_input(BenchmarkId::new("hot_variables", readers), &ledger, |b, ledger| {
            b.iter(|| {
                black_box(commit_edges(
                    &committer,
                    written.iter(),
                    &observed,
                    readers as u64 + 1,
                    ledger,
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_replay, bench_cycle_detection, bench_commit_edges);
criterion_main!(benches);
