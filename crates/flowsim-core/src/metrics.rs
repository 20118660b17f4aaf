//! Per-tick measurements sampled off the physical graph and every
//! controller's view: RMSE against a perfectly balanced allocation, the
//! pairwise distance between views, and a diagnostic trace record.

use std::collections::BTreeMap;

use crate::ledger::EdgeLedger;
use crate::topology::{EdgeId, Topology};

/// `sqrt(sum((used_i - opt_i)^2))` over `edges`, where `opt_i = rho * cap_i`
/// and `rho` is the global fill fraction `sum(used)/sum(cap)` over the same
/// edge set. Zero exactly when every edge in the set is filled to the same
/// fraction of its capacity.
pub fn rmse(topology: &Topology, ledger: &EdgeLedger, edges: impl Iterator<Item = EdgeId> + Clone) -> f64 {
    let (sum_used, sum_cap) = edges.clone().fold((0.0, 0.0), |(su, sc), e| {
        (su + ledger.used(e), sc + topology.capacity(e))
    });
    if sum_cap == 0.0 {
        return 0.0;
    }
    let rho = sum_used / sum_cap;
    let sq: f64 = edges
        .map(|e| {
            let opt = rho * topology.capacity(e);
            (ledger.used(e) - opt).powi(2)
        })
        .sum();
    sq.sqrt()
}

/// RMSE over every edge in the topology.
pub fn rmse_links(topology: &Topology, ledger: &EdgeLedger) -> f64 {
    rmse(topology, ledger, topology.edges())
}

/// RMSE restricted to edges with a server endpoint.
pub fn rmse_servers(topology: &Topology, ledger: &EdgeLedger) -> f64 {
    let server_edges: Vec<EdgeId> = topology
        .edges()
        .filter(|&e| {
            let (u, v) = topology.edge_endpoints(e);
            topology.kind(u) == crate::topology::NodeKind::Server
                || topology.kind(v) == crate::topology::NodeKind::Server
        })
        .collect();
    rmse(topology, ledger, server_edges.into_iter())
}

/// Euclidean distance between two ledgers' `used` vectors over every edge.
pub fn view_distance(topology: &Topology, a: &EdgeLedger, b: &EdgeLedger) -> f64 {
    topology
        .edges()
        .map(|e| (a.used(e) - b.used(e)).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// One diagnostic snapshot of the whole simulation at a tick boundary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TraceRecord {
    pub time: f64,
    /// Server name -> (used, capacity) on its single incident edge.
    pub server_usage: BTreeMap<String, (f64, f64)>,
    /// Switch name -> summed size of active flows ingressing there.
    pub ingress_rate: BTreeMap<String, f64>,
    /// Edge label ("from->to") -> used, for the physical graph.
    pub physical_edges: BTreeMap<String, f64>,
    /// Controller name -> (edge label -> used), one entry per controller.
    pub controller_edges: BTreeMap<String, BTreeMap<String, f64>>,
}

fn edge_label(topology: &Topology, edge: EdgeId) -> String {
    let (u, v) = topology.edge_endpoints(edge);
    format!("{}->{}", topology.name(u), topology.name(v))
}

fn edge_used_map(topology: &Topology, ledger: &EdgeLedger) -> BTreeMap<String, f64> {
    topology
        .edges()
        .map(|e| (edge_label(topology, e), ledger.used(e)))
        .collect()
}

/// Builds the trace record for one tick given the physical ledger and the
/// named set of controller views (name -> ledger) to report alongside it.
pub fn sample_trace(
    topology: &Topology,
    time: f64,
    physical: &EdgeLedger,
    controllers: &[(&str, &EdgeLedger)],
) -> TraceRecord {
    let mut server_usage = BTreeMap::new();
    for server in topology.servers() {
        if let Ok(sw) = topology.server_switch(server) {
            if let Some(edge) = topology.edge_between(server, sw) {
                server_usage.insert(
                    topology.name(server).to_string(),
                    (physical.used(edge), topology.capacity(edge)),
                );
            }
        }
    }

    let mut ingress_rate: BTreeMap<String, f64> = BTreeMap::new();
    for node in topology.switches() {
        ingress_rate.insert(topology.name(node).to_string(), 0.0);
    }
    for (path, size) in physical.active_flows() {
        if let Some(&ingress) = path.last() {
            let name = topology.name(ingress).to_string();
            *ingress_rate.entry(name).or_insert(0.0) += size;
        }
    }

    let physical_edges = edge_used_map(topology, physical);
    let controller_edges = controllers
        .iter()
        .map(|&(name, ledger)| (name.to_string(), edge_used_map(topology, ledger)))
        .collect();

    TraceRecord {
        time,
        server_usage,
        ingress_rate,
        physical_edges,
        controller_edges,
    }
}

/// Parallel named series sampled once per tick, matching the "mapping from
/// metric name to a list of per-tick values" output shape.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsSeries {
    pub rmse_links: Vec<f64>,
    pub rmse_servers: Vec<f64>,
    /// Pairwise distances recorded per tick, only meaningful (non-empty) in
    /// the two-controller case: `[dist(a,b), dist(a,physical), dist(b,physical)]`.
    pub state_distances: Vec<Vec<f64>>,
    pub simulation_trace: Vec<TraceRecord>,
}

impl MetricsSeries {
    pub fn push(&mut self, rmse_links: f64, rmse_servers: f64, state_distances: Vec<f64>, trace: TraceRecord) {
        self.rmse_links.push(rmse_links);
        self.rmse_servers.push(rmse_servers);
        self.state_distances.push(state_distances);
        self.simulation_trace.push(trace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{NodeId, NodeKind};

    fn two_edge_topology() -> (Topology, NodeId, NodeId, NodeId) {
        let mut b = Topology::builder();
        let s1 = b.add_node("s1", NodeKind::Server);
        let s2 = b.add_node("s2", NodeKind::Server);
        let sw1 = b.add_node("sw1", NodeKind::Switch);
        b.add_edge(s1, sw1, 100.0);
        b.add_edge(s2, sw1, 100.0);
        (b.build().unwrap(), s1, s2, sw1)
    }

    #[test]
    fn rmse_is_zero_when_balanced() {
        let (topo, s1, s2, sw1) = two_edge_topology();
        let mut ledger = EdgeLedger::new(topo.edge_count());
        ledger.set_used(topo.edge_between(s1, sw1).unwrap(), 40.0);
        ledger.set_used(topo.edge_between(s2, sw1).unwrap(), 40.0);
        assert_eq!(rmse_links(&topo, &ledger), 0.0);
    }

    #[test]
    fn rmse_is_positive_when_imbalanced() {
        let (topo, s1, s2, sw1) = two_edge_topology();
        let mut ledger = EdgeLedger::new(topo.edge_count());
        ledger.set_used(topo.edge_between(s1, sw1).unwrap(), 80.0);
        ledger.set_used(topo.edge_between(s2, sw1).unwrap(), 0.0);
        assert!(rmse_links(&topo, &ledger) > 0.0);
    }

    #[test]
    fn view_distance_matches_manual_vector() {
        let (topo, s1, s2, sw1) = two_edge_topology();
        let mut a = EdgeLedger::new(topo.edge_count());
        let mut b = EdgeLedger::new(topo.edge_count());
        a.set_used(topo.edge_between(s1, sw1).unwrap(), 3.0);
        b.set_used(topo.edge_between(s1, sw1).unwrap(), 0.0);
        a.set_used(topo.edge_between(s2, sw1).unwrap(), 4.0);
        b.set_used(topo.edge_between(s2, sw1).unwrap(), 0.0);
        assert_eq!(view_distance(&topo, &a, &b), 5.0);
    }
}
