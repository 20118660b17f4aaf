//! LinkBalancer: minimize the worst-link utilization over all known
//! server paths, breaking ties by path length.

use crate::path::{best_candidate, candidate_paths, path_metric};
use crate::topology::NodeId;
use crate::view::ControllerView;

pub fn handle_request(
    view: &ControllerView,
    servers: &[NodeId],
    ingress: NodeId,
    size: f64,
) -> Option<Vec<NodeId>> {
    let paths = candidate_paths(view, ingress, servers);
    let best = best_candidate(&paths, |path| path_metric(view, path, size))?;
    Some(best.path)
}
