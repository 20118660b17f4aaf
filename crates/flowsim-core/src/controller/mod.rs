//! A controller governs a set of switches, holds a private [`ControllerView`]
//! of the network, and decides which path a new flow takes. The routing
//! policy itself is one of four variants, each implemented as a free
//! function in its own submodule; this module only owns the state shared by
//! all of them and dispatches to the right one.

pub mod greedy;
pub mod link_balancer;
pub mod random;
pub mod separate_state;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::ledger::{AllocationOutcome, AllocatorError};
use crate::ledger::Time;
use crate::topology::{EdgeId, NodeId, Topology};
use crate::view::ControllerView;

/// Which routing policy a [`Controller`] runs. Closed set: every variant the
/// system supports is enumerated here rather than behind a trait object,
/// since all four are fixed and known up front.
#[derive(Debug, Clone)]
pub enum ControllerKind {
    LinkBalancer,
    GreedyLocal { greedy_limit: f64 },
    RandomChoice,
    SeparateState { alpha: f64 },
}

/// One controller instance: a name, the switches it governs, the servers
/// reachable through them, and the private view of the network it routes
/// against.
pub struct Controller {
    name: String,
    switches: Vec<NodeId>,
    local_servers: Vec<NodeId>,
    view: ControllerView,
    kind: ControllerKind,
    rng: SmallRng,
}

impl Controller {
    pub fn new(
        name: impl Into<String>,
        topology: std::sync::Arc<Topology>,
        switches: Vec<NodeId>,
        kind: ControllerKind,
        seed: u64,
    ) -> Self {
        let local_servers = topology
            .servers()
            .into_iter()
            .filter(|&s| {
                topology
                    .server_switch(s)
                    .map(|sw| switches.contains(&sw))
                    .unwrap_or(false)
            })
            .collect();
        let view = ControllerView::new(std::sync::Arc::clone(&topology), &switches);
        Self {
            name: name.into(),
            switches,
            local_servers,
            view,
            kind,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn switches(&self) -> &[NodeId] {
        &self.switches
    }

    pub fn local_servers(&self) -> &[NodeId] {
        &self.local_servers
    }

    pub fn view(&self) -> &ControllerView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ControllerView {
        &mut self.view
    }

    /// Chooses a path for a new flow entering at `ingress` bound for one of
    /// `servers`, committing it in this controller's own view. Returns
    /// `None` when no candidate path was feasible (the request is dropped);
    /// a returned path is what the simulation scheduler in turn commits
    /// into the physical graph, regardless of whether this view's own
    /// allocate call reports `Committed` or `Rejected` — a rejection here
    /// reflects this controller's view being a stale estimate, not a
    /// reason to drop the request (see `AllocatorError`).
    pub fn handle_request(
        &mut self,
        servers: &[NodeId],
        ingress: NodeId,
        size: f64,
        now: Time,
        duration: Time,
    ) -> Result<Option<Vec<NodeId>>, AllocatorError> {
        let chosen = match &self.kind {
            ControllerKind::LinkBalancer => {
                link_balancer::handle_request(&self.view, servers, ingress, size)
            }
            ControllerKind::GreedyLocal { greedy_limit } => greedy::handle_request(
                &self.view,
                servers,
                &self.local_servers,
                *greedy_limit,
                ingress,
                size,
            ),
            ControllerKind::RandomChoice => {
                random::handle_request(&self.view, servers, ingress, &mut self.rng)
            }
            ControllerKind::SeparateState { alpha } => {
                separate_state::handle_request(&self.view, servers, ingress, size, *alpha)
            }
        };

        let Some(path) = chosen else {
            return Ok(None);
        };
        let _: AllocationOutcome = self.view.allocate(&path, size, now, duration)?;
        Ok(Some(path))
    }

    /// Pushes this controller's known state for `edges` toward `peer`,
    /// using whichever sync semantics this controller's variant defines.
    pub fn sync_toward(&self, peer: &mut Controller, edges: Option<&[EdgeId]>, timestep: u64) {
        match &self.kind {
            ControllerKind::SeparateState { .. } => {
                self.view.sync_sync_used_toward(&mut peer.view, edges, timestep)
            }
            _ => self.view.sync_used_toward(&mut peer.view, edges, timestep),
        }
    }

    /// Refreshes this controller's view of its own governed edges from the
    /// authoritative physical ledger.
    pub fn refresh_local_state(&mut self, physical: &crate::ledger::EdgeLedger) {
        self.view.refresh_local_state(physical);
    }

    /// Releases every flow this controller's own ledger knows has expired by
    /// `now`.
    pub fn free(&mut self, now: Time) -> Result<usize, AllocatorError> {
        self.view.free(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::NodeKind;
    use std::sync::Arc;

    fn two_switch_topology() -> (Arc<Topology>, NodeId, NodeId, NodeId, NodeId) {
        let mut b = Topology::builder();
        let s1 = b.add_node("s1", NodeKind::Server);
        let s2 = b.add_node("s2", NodeKind::Server);
        let sw1 = b.add_node("sw1", NodeKind::Switch);
        let sw2 = b.add_node("sw2", NodeKind::Switch);
        b.add_edge(s1, sw1, 100.0);
        b.add_edge(s2, sw2, 100.0);
        b.add_edge(sw1, sw2, 1001.0);
        b.add_edge(sw2, sw1, 1001.0);
        (Arc::new(b.build().unwrap()), s1, s2, sw1, sw2)
    }

    #[test]
    fn handle_request_commits_the_chosen_path() {
        let (topo, s1, s2, sw1, sw2) = two_switch_topology();
        let mut a = Controller::new(
            "a",
            Arc::clone(&topo),
            vec![sw1],
            ControllerKind::LinkBalancer,
            1,
        );
        let servers = vec![s1, s2];
        let path = a
            .handle_request(&servers, sw1, 10.0, 0.0, 5.0)
            .unwrap()
            .unwrap();
        assert_eq!(path, vec![s1, sw1]);
        let edge = topo.edge_between(s1, sw1).unwrap();
        assert_eq!(a.view().ledger().used(edge), 10.0);
    }

    #[test]
    fn sync_toward_overwrites_foreign_edges_only() {
        let (topo, s1, _s2, sw1, sw2) = two_switch_topology();
        let mut a = Controller::new(
            "a",
            Arc::clone(&topo),
            vec![sw1],
            ControllerKind::LinkBalancer,
            1,
        );
        let mut b = Controller::new(
            "b",
            Arc::clone(&topo),
            vec![sw2],
            ControllerKind::LinkBalancer,
            2,
        );
        let edge = topo.edge_between(s1, sw1).unwrap();
        a.view.ledger_mut().set_used(edge, 40.0);
        a.sync_toward(&mut b, None, 1);
        assert_eq!(b.view().ledger().used(edge), 40.0);
    }
}
