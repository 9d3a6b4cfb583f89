//! # Failure and Recovery Flows
//!
//! Longer hand-written logs around site failures, replayed by the runtime.

#[cfg(test)]
mod tests {
    use ssi_engine::{AbortReason, EngineConfig, Event, MemorySink, TxnId};
    use ssi_runtime::replay_named;

    fn replay(log: &str) -> MemorySink {
        let mut sink = MemorySink::new();
        replay_named("flow", log.as_bytes(), &EngineConfig::default(), &mut sink).unwrap();
        sink
    }

    fn t(id: &str) -> TxnId {
        TxnId::from(id)
    }

    fn aborted(sink: &MemorySink) -> Vec<(TxnId, AbortReason)> {
        sink.events()
            .filter_map(|event| match event {
                Event::Aborted { txn, reason } => Some((txn.clone(), reason.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_failure_aborts_only_writers_at_that_site() {
        let sink = replay(
            "begin(T1)\n\
             begin(T2)\n\
             beginRO(T3)\n\
             begin(T4)\n\
             W(T1,x2,1)\n\
             R(T2,x2)\n\
             R(T3,x2)\n\
             W(T4,x5,5)\n\
             fail(1)\n\
             end(T2)\n\
             end(T3)\n\
             end(T4)\n",
        );

        // x2 is everywhere so T1 loses its copy at site 1; x5 lives at site 6
        assert_eq!(
            aborted(&sink),
            vec![(t("T1"), AbortReason::SiteFailure { site: 1 })]
        );
        let lines = sink.lines();
        assert!(lines.contains(&"T2 commits at time 10".to_string()));
        assert!(lines.contains(&"T3 commits at time 11".to_string()));
        assert!(lines.contains(&"T4 commits at time 12".to_string()));
    }

    #[test]
    fn test_commit_skips_down_site_and_recovery_leaves_it_stale() {
        let sink = replay(
            "fail(3)\n\
             begin(T1)\n\
             W(T1,x2,77)\n\
             end(T1)\n\
             recover(3)\n\
             dump()\n",
        );

        let dump = sink.lines().last().cloned().unwrap();
        let rows: Vec<&str> = dump.lines().collect();
        assert!(rows[1].starts_with("site 2 - x1: 10, x2: 77"));
        assert!(rows[2].starts_with("site 3 - x2: 20"));
        assert!(sink
            .lines()
            .contains(&"site 3 recovers (10 replicated copies await a fresh commit)".to_string()));
    }

    #[test]
    fn test_reads_avoid_stale_copies_until_rewritten() {
        let sink = replay(
            "fail(1)\n\
             recover(1)\n\
             begin(T1)\n\
             R(T1,x4)\n\
             W(T1,x4,400)\n\
             end(T1)\n\
             begin(T2)\n\
             R(T2,x4)\n",
        );

        let lines = sink.lines();
        assert!(lines.contains(&"T1 reads x4 = 40 at site 2".to_string()));
        assert!(lines.contains(&"T2 reads x4 = 400 at site 1".to_string()));
    }

    #[test]
    fn test_stale_everywhere_aborts_reader() {
        let mut log = String::new();
        for site in 1..=10 {
            log.push_str(&format!("fail({site})\nrecover({site})\n"));
        }
        log.push_str("begin(T1)\nR(T1,x8)\nR(T1,x9)\n");
        let sink = replay(&log);

        assert_eq!(
            aborted(&sink),
            vec![(t("T1"), AbortReason::ReadUnavailable { variable: 8 })]
        );
        // T1 is gone by the time of its second read
        assert_eq!(sink.runs()[0].notices, vec!["Transaction T1 is not active".to_string()]);
    }
}
