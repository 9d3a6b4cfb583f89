//! Serialization graph storage
//!
//! Directed graph over transaction ids with one edge per ordered pair. The
//! kind recorded is the one that first justified the pair.

use super::value_objects::{EdgeKind, TxnId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialization graph edge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Transaction that acted first
    pub from: TxnId,
    /// Committing transaction
    pub to: TxnId,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(from: TxnId, to: TxnId, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SerializationGraph {
    /// Adjacency list: from -> [(to, kind), ...]
    adjacency: BTreeMap<TxnId, Vec<(TxnId, EdgeKind)>>,
    edge_count: usize,
}

impl SerializationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge unless the ordered pair is already connected.
    /// Self-loops are ignored.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if edge.from == edge.to || self.has_edge(&edge.from, &edge.to) {
            return false;
        }
        self.adjacency.entry(edge.to.clone()).or_default();
        self.adjacency
            .entry(edge.from)
            .or_default()
            .push((edge.to, edge.kind));
        self.edge_count += 1;
        true
    }

    pub fn remove_edge(&mut self, from: &TxnId, to: &TxnId) -> bool {
        let Some(neighbors) = self.adjacency.get_mut(from) else {
            return false;
        };
        let before = neighbors.len();
        neighbors.retain(|(target, _)| target != to);
        let removed = neighbors.len() < before;
        if removed {
            self.edge_count -= 1;
        }
        removed
    }

    pub fn has_edge(&self, from: &TxnId, to: &TxnId) -> bool {
        self.adjacency
            .get(from)
            .map(|neighbors| neighbors.iter().any(|(target, _)| target == to))
            .unwrap_or(false)
    }

    pub fn edge_kind(&self, from: &TxnId, to: &TxnId) -> Option<EdgeKind> {
        self.adjacency
            .get(from)?
            .iter()
            .find(|(target, _)| target == to)
            .map(|(_, kind)| *kind)
    }

    pub fn neighbors(&self, node: &TxnId) -> &[(TxnId, EdgeKind)] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &TxnId> {
        self.adjacency.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().flat_map(|(from, neighbors)| {
            neighbors
                .iter()
                .map(move |(to, kind)| Edge::new(from.clone(), to.clone(), *kind))
        })
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
