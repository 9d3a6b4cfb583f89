//! Domain invariants for the SSI engine
//!
//! Checked by the test suites after arbitrary command sequences.

use super::graph::SerializationGraph;
use super::site::Site;
use super::value_objects::{Value, VariableId};
use crate::algorithms::find_dangerous_cycle;
use std::collections::BTreeMap;

/// INVARIANT-1: Monotonic History
/// Every committed history is non-decreasing in commit time and keeps its seed version.
pub fn invariant_history_monotonic(site: &Site) -> bool {
    site.variables().all(|var| {
        let history = var.history();
        history.first().map(|v| v.commit_time == 0).unwrap_or(false)
            && history
                .windows(2)
                .all(|pair| pair[0].commit_time <= pair[1].commit_time)
    })
}

/// INVARIANT-2: No Dangerous Structure
/// The committed serialization graph never holds a cycle with two adjacent RW edges.
pub fn invariant_no_dangerous_structure(graph: &SerializationGraph) -> bool {
    find_dangerous_cycle(graph).is_none()
}

/// INVARIANT-3: Replica Agreement
/// Readable copies of a replicated variable on up sites hold the same latest value.
pub fn invariant_replicas_agree<'a>(sites: impl IntoIterator<Item = &'a Site>) -> bool {
    let mut seen: BTreeMap<VariableId, Value> = BTreeMap::new();

    for site in sites {
        for var in site.variables() {
            if !var.is_replicated() || !site.is_readable(var.id()) {
                continue;
            }
            let value = var.latest().value;
            match seen.get(&var.id()) {
                Some(&other) if other != value => return false,
                Some(_) => {}
                None => {
                    seen.insert(var.id(), value);
                }
            }
        }
    }

    true
}
