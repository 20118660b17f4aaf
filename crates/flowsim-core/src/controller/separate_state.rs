//! SeparateState: keeps two counters per foreign edge — `used` (load this
//! controller itself routed through the edge) and `sync_used` (the value
//! last pushed by the edge's owner) — and nudges load between exactly two
//! server paths toward whichever the sync-informed view says is less
//! loaded, scaled by `alpha`.
//!
//! The shift-by formula is only well-defined for a two-path setting;
//! generalizing it to N paths is left undecided (see DESIGN.md), so this
//! module hard-requires exactly two candidate paths.

use crate::path::candidate_paths;
use crate::topology::NodeId;
use crate::view::ControllerView;

/// Per-edge metric that prefers the sync-learned value over the locally
/// tracked one when it indicates more load, to avoid under-estimating
/// contention another controller has caused since the last sync. Set
/// `local_contrib` to use only this controller's own tracked `used`,
/// ignoring any sync-learned value (used to compare "my own" load across
/// paths rather than the blended view).
pub fn path_metric(
    view: &ControllerView,
    path: &[NodeId],
    size: f64,
    local_contrib: bool,
) -> Option<f64> {
    let mut worst = 0.0f64;
    for window in path.windows(2) {
        let edge = view
            .topology()
            .edge_between(window[0], window[1])
            .expect("path is not contiguous in the graph");
        let local_used = view.ledger().used(edge);
        let used = if local_contrib {
            local_used + size
        } else {
            match view.sync_used(edge) {
                Some(sync) => (sync + size).max(local_used + size),
                None => local_used + size,
            }
        };
        let capacity = view.topology().capacity(edge);
        let metric = used / capacity;
        if metric > 1.0 {
            return None;
        }
        worst = worst.max(metric);
    }
    Some(worst)
}

/// Ratio of sync-informed load between the two candidate paths, and the
/// fraction of the heavier path's load that a balanced split would shift
/// onto the lighter one.
fn calculate_shift(view: &ControllerView, paths: &[Vec<NodeId>]) -> (Option<usize>, f64) {
    debug_assert_eq!(paths.len(), 2);
    let metrics: Vec<f64> = paths
        .iter()
        .map(|p| path_metric(view, p, 0.0, false).unwrap_or(0.0))
        .collect();
    let max_metric = metrics.iter().cloned().fold(0.0f64, f64::max);
    if max_metric == 0.0 {
        return (None, 0.0);
    }
    let mean = metrics.iter().sum::<f64>() / metrics.len() as f64;
    let shift_by = (max_metric - mean) / max_metric;
    let shift_from = metrics
        .iter()
        .position(|&m| m == max_metric)
        .expect("max_metric was derived from this slice");
    (Some(shift_from), shift_by)
}

pub fn handle_request(
    view: &ControllerView,
    servers: &[NodeId],
    ingress: NodeId,
    size: f64,
    alpha: f64,
) -> Option<Vec<NodeId>> {
    let paths = candidate_paths(view, ingress, servers);
    if paths.len() != 2 {
        // Falls back to the plain link-balancer search outside the
        // two-path setting this variant's shift math assumes.
        let best = crate::path::best_candidate(&paths, |p| path_metric(view, p, size, true));
        return best.map(|c| c.path);
    }

    let shortest_idx = if paths[0].len() <= paths[1].len() { 0 } else { 1 };
    let (shift_from, shift_by) = calculate_shift(view, &paths);

    let Some(shift_from) = shift_from else {
        return Some(paths[shortest_idx].clone());
    };
    let shift_to = 1 - shift_from;

    let local_metrics: Vec<f64> = paths
        .iter()
        .map(|p| path_metric(view, p, 0.0, true).unwrap_or(0.0))
        .collect();

    let shift_metric = local_metrics[shift_from];
    let receive_metric = local_metrics[shift_to];

    if receive_metric == 0.0 {
        let min_idx = if local_metrics[0] <= local_metrics[1] { 0 } else { 1 };
        return Some(paths[min_idx].clone());
    }

    let current_ratio = shift_metric / receive_metric;
    let goal_shift_metric = shift_metric * (1.0 - shift_by * alpha);
    let goal_receive_metric = receive_metric + shift_metric * (shift_by * alpha);
    let goal_ratio = if goal_receive_metric == 0.0 {
        100_000.0
    } else {
        goal_shift_metric / goal_receive_metric
    };

    let max_idx = if local_metrics[0] >= local_metrics[1] { 0 } else { 1 };
    let min_idx = if local_metrics[0] <= local_metrics[1] { 0 } else { 1 };

    match (goal_ratio - current_ratio).partial_cmp(&0.0) {
        Some(std::cmp::Ordering::Less) => Some(paths[min_idx].clone()),
        Some(std::cmp::Ordering::Greater) => Some(paths[max_idx].clone()),
        _ => Some(paths[shortest_idx].clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{NodeKind, Topology};
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
    fn path_metric_prefers_the_worse_of_used_and_sync_used() {
        let (topo, s1, s2, sw1, sw2) = two_switch_topology();
        // `edge` belongs to sw1, so it must be foreign to `view` for the
        // sync to take effect: view governs sw2, owner governs sw1.
        let mut owner = ControllerView::new(Arc::clone(&topo), &[sw1]);
        let mut view = ControllerView::new(Arc::clone(&topo), &[sw2]);
        let edge = topo.edge_between(s1, sw1).unwrap();

        // Own tracking says lightly loaded, but a peer's sync pushed a
        // much higher value for this foreign edge: the blended metric
        // must reflect the worse (sync) reading, not the local one.
        view.ledger_mut().set_used(edge, 5.0);
        owner.ledger_mut().set_used(edge, 80.0);
        owner.sync_sync_used_toward(&mut view, Some(&[edge]), 1);

        let blended = path_metric(&view, &[s1, sw1], 0.0, false).unwrap();
        assert!((blended - 0.8).abs() < 1e-9);

        let local = path_metric(&view, &[s1, sw1], 0.0, true).unwrap();
        assert!((local - 0.05).abs() < 1e-9);
        let _ = s2;
        let _ = sw2;
    }

    #[test]
    fn handle_request_returns_a_feasible_candidate() {
        let (topo, s1, s2, sw1, sw2) = two_switch_topology();
        let b = ControllerView::new(Arc::clone(&topo), &[sw2]);
        let servers = vec![s1, s2];
        let path = handle_request(&b, &servers, sw2, 1.0, 0.5).unwrap();
        assert!(path == vec![s1, sw1, sw2] || path == vec![s2, sw2]);
    }
}
