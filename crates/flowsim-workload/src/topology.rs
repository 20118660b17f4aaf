//! Constructors for the two fixed topology shapes the worked scenarios use:
//! one switch with two directly-attached servers, and two switches joined
//! by an inter-switch trunk, each with one attached server. Both are
//! external-collaborator plumbing — the simulation core only ever consumes
//! a [`Topology`], never builds one.

use flowsim_core::{NodeId, NodeKind, Topology, TopologyError};

/// One switch (`sw1`), two servers (`s1`, `s2`) each with a direct edge of
/// `server_capacity`. Used by scenario S1.
pub fn single_switch_two_servers(
    server_capacity: f64,
) -> Result<(Topology, NodeId, NodeId, NodeId), TopologyError> {
    let mut b = Topology::builder();
    let s1 = b.add_node("s1", NodeKind::Server);
    let s2 = b.add_node("s2", NodeKind::Server);
    let sw1 = b.add_node("sw1", NodeKind::Switch);
    b.add_edge(s1, sw1, server_capacity);
    b.add_edge(s2, sw1, server_capacity);
    let topo = b.build()?;
    Ok((topo, s1, s2, sw1))
}

/// Two switches (`sw1`, `sw2`), each with one directly-attached server
/// (`s1`, `s2`) of `server_capacity`, joined by a bidirectional trunk of
/// `trunk_capacity`. Used by scenarios S2–S4.
pub fn two_switch_trunk(
    server_capacity: f64,
    trunk_capacity: f64,
) -> Result<(Topology, NodeId, NodeId, NodeId, NodeId), TopologyError> {
    let mut b = Topology::builder();
    let s1 = b.add_node("s1", NodeKind::Server);
    let s2 = b.add_node("s2", NodeKind::Server);
    let sw1 = b.add_node("sw1", NodeKind::Switch);
    let sw2 = b.add_node("sw2", NodeKind::Switch);
    b.add_edge(s1, sw1, server_capacity);
    b.add_edge(s2, sw2, server_capacity);
    b.add_edge(sw1, sw2, trunk_capacity);
    b.add_edge(sw2, sw1, trunk_capacity);
    let topo = b.build()?;
    Ok((topo, s1, s2, sw1, sw2))
}
