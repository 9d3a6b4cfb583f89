//! Dangerous-structure detection
//!
//! Dangerous structures are found by walking simple paths with an on-path set
//! and no visited-node pruning: either every elementary cycle, rooted at its
//! smallest node, or only the cycles that close through one given edge.
//! Three-colour DFS answers the plain "any cycle" query.

use crate::domain::graph::{Edge, SerializationGraph};
use crate::domain::value_objects::{EdgeKind, TxnId};
use std::collections::{BTreeMap, BTreeSet};

/// A cycle as `(node, kind of the edge leaving node)`; the last edge returns to the first node.
pub type Cycle = Vec<(TxnId, EdgeKind)>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Grey,
    Black,
}

/// True if the closed edge sequence has two adjacent RW edges, wrap-around included.
pub fn has_consecutive_anti_dependencies(kinds: &[EdgeKind]) -> bool {
    let n = kinds.len();
    n >= 2
        && (0..n).any(|i| kinds[i] == EdgeKind::ReadWrite && kinds[(i + 1) % n] == EdgeKind::ReadWrite)
}

/// Find any elementary cycle containing two consecutive RW edges.
pub fn find_dangerous_cycle(graph: &SerializationGraph) -> Option<Cycle> {
    graph.nodes().find_map(|root| {
        let mut walk = Walk::new(graph, root, Some(root));
        walk.extend(root)
    })
}

/// Find a dangerous cycle that uses `edge`.
///
/// If the graph was free of dangerous structures before `edge` went in, this
/// is the only place a new one can appear.
pub fn find_dangerous_cycle_through(graph: &SerializationGraph, edge: &Edge) -> Option<Cycle> {
    let mut walk = Walk::new(graph, &edge.from, None);
    walk.path.push(&edge.from);
    walk.on_path.insert(&edge.from);
    walk.kinds.push(edge.kind);
    walk.extend(&edge.to)
}

/// Find any cycle, dangerous or not.
pub fn find_any_cycle(graph: &SerializationGraph) -> Option<Cycle> {
    let mut search = Search::new(graph);
    search.run()
}

/// Simple-path walk back to `goal`
struct Walk<'a> {
    graph: &'a SerializationGraph,
    goal: &'a TxnId,
    /// Only nodes strictly above the floor may be entered
    floor: Option<&'a TxnId>,
    path: Vec<&'a TxnId>,
    on_path: BTreeSet<&'a TxnId>,
    /// `kinds[i]` labels the edge leaving `path[i]`
    kinds: Vec<EdgeKind>,
}

impl<'a> Walk<'a> {
    fn new(graph: &'a SerializationGraph, goal: &'a TxnId, floor: Option<&'a TxnId>) -> Self {
        Self {
            graph,
            goal,
            floor,
            path: Vec::new(),
            on_path: BTreeSet::new(),
            kinds: Vec::new(),
        }
    }

    fn extend(&mut self, node: &'a TxnId) -> Option<Cycle> {
        self.path.push(node);
        self.on_path.insert(node);

        let graph = self.graph;
        for (next, kind) in graph.neighbors(node) {
            self.kinds.push(*kind);
            let found = if next == self.goal {
                has_consecutive_anti_dependencies(&self.kinds).then(|| self.cycle())
            } else if !self.on_path.contains(next) && self.floor.map_or(true, |floor| next > floor) {
                self.extend(next)
            } else {
                None
            };
            if found.is_some() {
                return found;
            }
            self.kinds.pop();
        }

        self.on_path.remove(node);
        self.path.pop();
        None
    }

    fn cycle(&self) -> Cycle {
        self.path
            .iter()
            .map(|node| (*node).clone())
            .zip(self.kinds.iter().copied())
            .collect()
    }
}

/// Three-colour DFS; every back edge closes a cycle.
struct Search<'a> {
    graph: &'a SerializationGraph,
    color: BTreeMap<&'a TxnId, Color>,
    /// Grey path from the DFS root
    path: Vec<&'a TxnId>,
    /// `kinds[i]` labels the edge `path[i] -> path[i + 1]`
    kinds: Vec<EdgeKind>,
}

impl<'a> Search<'a> {
    fn new(graph: &'a SerializationGraph) -> Self {
        Self {
            graph,
            color: BTreeMap::new(),
            path: Vec::new(),
            kinds: Vec::new(),
        }
    }

    fn run(&mut self) -> Option<Cycle> {
        let graph = self.graph;
        for node in graph.nodes() {
            if self.color.contains_key(node) {
                continue;
            }
            if let Some(cycle) = self.visit(node) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit(&mut self, node: &'a TxnId) -> Option<Cycle> {
        self.color.insert(node, Color::Grey);
        self.path.push(node);

        let graph = self.graph;
        for (next, kind) in graph.neighbors(node) {
            match self.color.get(next) {
                Some(Color::Grey) => return self.close_cycle(next, *kind),
                Some(Color::Black) => {}
                None => {
                    self.kinds.push(*kind);
                    if let Some(cycle) = self.visit(next) {
                        return Some(cycle);
                    }
                    self.kinds.pop();
                }
            }
        }

        self.path.pop();
        self.color.insert(node, Color::Black);
        None
    }

    /// Build the cycle from `start` (grey) to the top of the path, closed by `closing`.
    fn close_cycle(&self, start: &TxnId, closing: EdgeKind) -> Option<Cycle> {
        let idx = self.path.iter().position(|node| *node == start)?;
        let mut kinds: Vec<EdgeKind> = self.kinds[idx..].to_vec();
        kinds.push(closing);

        Some(
            self.path[idx..]
                .iter()
                .map(|node| (*node).clone())
                .zip(kinds)
                .collect(),
        )
    }
}
