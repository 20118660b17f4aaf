//! RandomChoice: a baseline that ignores utilization entirely and returns
//! a uniformly random server path, feasible or not.

use rand::Rng;

use crate::path::candidate_paths;
use crate::topology::NodeId;
use crate::view::ControllerView;

pub fn handle_request(
    view: &ControllerView,
    servers: &[NodeId],
    ingress: NodeId,
    rng: &mut impl Rng,
) -> Option<Vec<NodeId>> {
    let paths = candidate_paths(view, ingress, servers);
    if paths.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..paths.len());
    Some(paths[idx].clone())
}
