//! Path metric and feasibility, factored as free functions over a
//! [`ControllerView`] so every controller variant shares one definition of
//! "how loaded is this path".

use tracing::info;

use crate::topology::NodeId;
use crate::view::ControllerView;

/// `max over edges of (edge.used + size) / capacity`, computed left to
/// right; as soon as an edge would exceed 1.0 the path is infeasible and
/// `None` is returned. Uses each edge's plain `used` value (ordinary
/// controllers); the separate-state variant has its own metric in
/// `crate::controller::separate_state`.
pub fn path_metric(view: &ControllerView, path: &[NodeId], size: f64) -> Option<f64> {
    let mut worst = 0.0f64;
    for window in path.windows(2) {
        let edge = view
            .topology()
            .edge_between(window[0], window[1])
            .expect("path is not contiguous in the graph");
        let used = view.ledger().used(edge);
        let capacity = view.topology().capacity(edge);
        let metric = (used + size) / capacity;
        if metric > 1.0 {
            info!(?edge, metric, "path may be oversubscribed, excluding candidate");
            return None;
        }
        worst = worst.max(metric);
    }
    Some(worst)
}

/// One candidate: a path, the pool of servers it was drawn from, and its
/// (metric, edge count) once scored.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: Vec<NodeId>,
    pub metric: f64,
    pub length: usize,
}

/// Enumerates the unique shortest path from every server in `servers` to
/// `ingress`, in `servers`' iteration order — the routing is assumed
/// pre-computed and static, so this is purely structural.
pub fn candidate_paths(view: &ControllerView, ingress: NodeId, servers: &[NodeId]) -> Vec<Vec<NodeId>> {
    servers
        .iter()
        .filter_map(|&server| view.topology().shortest_path(server, ingress))
        .collect()
}

/// Scores every path with `metric_fn`, keeping only feasible ones, then
/// picks the minimum metric, breaking ties by minimum edge count — the
/// min-max routing objective. `metric_fn` lets the separate-state variant
/// substitute its own blended metric without duplicating this search.
pub fn best_candidate(
    paths: &[Vec<NodeId>],
    mut metric_fn: impl FnMut(&[NodeId]) -> Option<f64>,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for path in paths {
        let Some(metric) = metric_fn(path) else {
            continue;
        };
        let length = path.len() - 1;
        let better = match &best {
            None => true,
            Some(b) => metric < b.metric || (metric == b.metric && length < b.length),
        };
        if better {
            best = Some(Candidate {
                path: path.clone(),
                metric,
                length,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{NodeKind, Topology};
    use std::sync::Arc;

    #[test]
    fn best_candidate_breaks_ties_by_length() {
        let short = vec![NodeId::new(0), NodeId::new(1)];
        let long = vec![NodeId::new(0), NodeId::new(2), NodeId::new(1)];
        let paths = vec![long.clone(), short.clone()];
        let best = best_candidate(&paths, |_| Some(0.5)).unwrap();
        assert_eq!(best.path, short);
    }

    #[test]
    fn path_metric_rejects_oversubscription() {
        let mut b = Topology::builder();
        let s1 = b.add_node("s1", NodeKind::Server);
        let sw1 = b.add_node("sw1", NodeKind::Switch);
        b.add_edge(s1, sw1, 10.0);
        let topo = Arc::new(b.build().unwrap());
        let view = ControllerView::new(Arc::clone(&topo), &[sw1]);
        assert_eq!(path_metric(&view, &[s1, sw1], 5.0), Some(0.5));
        assert_eq!(path_metric(&view, &[s1, sw1], 11.0), None);
    }
}
