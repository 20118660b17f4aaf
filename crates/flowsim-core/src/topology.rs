//! Directed network topology: switches and servers joined by capacitated
//! edges.
//!
//! The topology is immutable once built — `capacity` never changes after
//! construction. Mutable per-edge `used` state lives outside this type, one
//! dense array per view (the physical graph, and one per controller),
//! indexed by [`EdgeId`]. This avoids a map-of-maps representation where
//! every view would hold a full copy of the graph object.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::DiGraph;
use petgraph::Direction;
use thiserror::Error;

/// Dense node index, stable for the lifetime of a [`Topology`].
pub type NodeId = petgraph::graph::NodeIndex<u32>;
/// Dense edge index, stable for the lifetime of a [`Topology`]. Used to
/// index per-view `used` arrays.
pub type EdgeId = petgraph::graph::EdgeIndex<u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Switch,
    Server,
}

#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("topology has no nodes")]
    Empty,
    #[error("server `{0}` has {1} incident switch edges, expected exactly 1")]
    ServerDegree(String, usize),
    #[error("node name `{0}` is not present in the topology")]
    UnknownNode(String),
    #[error("no edge between `{0}` and `{1}`")]
    NoSuchEdge(String, String),
}

/// A directed graph of switches and servers. Edge weights are `capacity`;
/// mutable `used` state is tracked externally by [`crate::ledger::EdgeLedger`].
#[derive(Debug, Clone)]
pub struct Topology {
    graph: DiGraph<NodeKind, f64, u32>,
    names: Vec<String>,
    by_name: HashMap<String, NodeId>,
}

impl Topology {
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.names[node.index()]
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.graph[node]
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn require_node(&self, name: &str) -> Result<NodeId, TopologyError> {
        self.node_by_name(name)
            .ok_or_else(|| TopologyError::UnknownNode(name.to_string()))
    }

    pub fn switches(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .node_indices()
            .filter(move |&n| self.graph[n] == NodeKind::Switch)
    }

    pub fn servers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .node_indices()
            .filter(move |&n| self.graph[n] == NodeKind::Server)
    }

    pub fn capacity(&self, edge: EdgeId) -> f64 {
        self.graph[edge]
    }

    pub fn edge_endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        self.graph.edge_endpoints(edge).expect("dangling edge id")
    }

    pub fn edge_between(&self, u: NodeId, v: NodeId) -> Option<EdgeId> {
        self.graph.find_edge(u, v)
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices()
    }

    /// The single switch a server is attached to. Fails the same way the
    /// source's `learn_local_servers`/`server_utilization` do when a server
    /// has more than one neighbor.
    pub fn server_switch(&self, server: NodeId) -> Result<NodeId, TopologyError> {
        let mut neighbors = self.graph.neighbors_directed(server, Direction::Outgoing);
        let first = neighbors.next();
        let extra = neighbors.count();
        match first {
            Some(sw) if extra == 0 => Ok(sw),
            Some(_) => Err(TopologyError::ServerDegree(
                self.name(server).to_string(),
                2 + extra,
            )),
            None => Err(TopologyError::ServerDegree(self.name(server).to_string(), 0)),
        }
    }

    /// Unweighted shortest path from `from` to `to`, following edge
    /// direction. Tie-breaks are whatever BFS visits first, which is a
    /// stable function of node insertion order (petgraph's adjacency lists
    /// are append-only vectors), giving deterministic tie-breaking without
    /// pinning a specific algorithm.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        if from == to {
            return Some(vec![from]);
        }
        let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from);
        let mut visited = std::collections::HashSet::new();
        visited.insert(from);
        while let Some(node) = queue.pop_front() {
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if visited.insert(next) {
                    prev.insert(next, node);
                    if next == to {
                        queue.clear();
                        break;
                    }
                    queue.push_back(next);
                }
            }
        }
        if !visited.contains(&to) {
            return None;
        }
        let mut path = vec![to];
        let mut cur = to;
        while cur != from {
            let p = *prev.get(&cur)?;
            path.push(p);
            cur = p;
        }
        path.reverse();
        Some(path)
    }
}

#[derive(Default)]
pub struct TopologyBuilder {
    graph: DiGraph<NodeKind, f64, u32>,
    names: Vec<String>,
    by_name: HashMap<String, NodeId>,
}

impl TopologyBuilder {
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let name = name.into();
        let id = self.graph.add_node(kind);
        debug_assert_eq!(id.index(), self.names.len());
        self.names.push(name.clone());
        self.by_name.insert(name, id);
        id
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: f64) -> EdgeId {
        self.graph.add_edge(from, to, capacity)
    }

    pub fn build(self) -> Result<Topology, TopologyError> {
        if self.graph.node_count() == 0 {
            return Err(TopologyError::Empty);
        }
        let topo = Topology {
            graph: self.graph,
            names: self.names,
            by_name: self.by_name,
        };
        for server in topo.servers() {
            topo.server_switch(server)?;
        }
        Ok(topo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_topology() -> Topology {
        let mut b = Topology::builder();
        let s1 = b.add_node("s1", NodeKind::Server);
        let sw1 = b.add_node("sw1", NodeKind::Switch);
        let sw2 = b.add_node("sw2", NodeKind::Switch);
        b.add_edge(s1, sw1, 100.0);
        b.add_edge(sw1, sw2, 100.0);
        b.build().unwrap()
    }

    #[test]
    fn shortest_path_follows_direction() {
        let topo = line_topology();
        let s1 = topo.require_node("s1").unwrap();
        let sw2 = topo.require_node("sw2").unwrap();
        let path = topo.shortest_path(s1, sw2).unwrap();
        assert_eq!(
            path.iter().map(|n| topo.name(*n)).collect::<Vec<_>>(),
            vec!["s1", "sw1", "sw2"]
        );
    }

    #[test]
    fn server_with_two_switches_is_rejected() {
        let mut b = Topology::builder();
        let s1 = b.add_node("s1", NodeKind::Server);
        let sw1 = b.add_node("sw1", NodeKind::Switch);
        let sw2 = b.add_node("sw2", NodeKind::Switch);
        b.add_edge(s1, sw1, 10.0);
        b.add_edge(s1, sw2, 10.0);
        assert_eq!(
            b.build().unwrap_err(),
            TopologyError::ServerDegree("s1".into(), 2)
        );
    }

    #[test]
    fn no_path_returns_none() {
        let mut b = Topology::builder();
        let s1 = b.add_node("s1", NodeKind::Server);
        let sw1 = b.add_node("sw1", NodeKind::Switch);
        b.add_node("sw2", NodeKind::Switch);
        b.add_edge(s1, sw1, 10.0);
        let topo = b.build().unwrap();
        let sw1id = topo.require_node("sw1").unwrap();
        let sw2id = topo.require_node("sw2").unwrap();
        assert!(topo.shortest_path(sw1id, sw2id).is_none());
    }
}
