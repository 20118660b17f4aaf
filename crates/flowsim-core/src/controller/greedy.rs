//! GreedyLocal: prefer servers in the controller's own domain, and only
//! spill to the full server set when the best local path would exceed
//! `greedy_limit`.

use crate::path::{best_candidate, candidate_paths, path_metric};
use crate::topology::NodeId;
use crate::view::ControllerView;

pub fn handle_request(
    view: &ControllerView,
    servers: &[NodeId],
    local_servers: &[NodeId],
    greedy_limit: f64,
    ingress: NodeId,
    size: f64,
) -> Option<Vec<NodeId>> {
    let local_paths = candidate_paths(view, ingress, local_servers);
    let local_best = best_candidate(&local_paths, |path| path_metric(view, path, size));

    let use_local = matches!(&local_best, Some(c) if c.metric <= greedy_limit);
    if use_local {
        return local_best.map(|c| c.path);
    }

    let all_paths = candidate_paths(view, ingress, servers);
    let global_best = best_candidate(&all_paths, |path| path_metric(view, path, size));
    global_best.map(|c| c.path)
}
