//! Resource accounting: reserving and releasing capacity along a path.
//!
//! One [`EdgeLedger`] backs the physical graph and one backs each
//! controller's private view. They never share storage — a view's ledger
//! is updated only by [`EdgeLedger::set_used`] (polling/sync) and by its
//! own `allocate`/`free` calls when the controller commits a path in its
//! own view.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use thiserror::Error;
use tracing::{info, warn};

use crate::topology::{EdgeId, NodeId, Topology};

pub type Time = f64;

#[derive(Debug, Error, PartialEq)]
pub enum AllocatorError {
    #[error("time must advance monotonically: now={now} < last_now={last_now}")]
    TimeNotMonotonic { now: Time, last_now: Time },
    #[error("path must contain at least one edge")]
    EmptyPath,
    #[error("duration must be positive, got {0}")]
    NonPositiveDuration(f64),
}

/// Result of an allocation attempt. Rejection is a normal outcome the
/// caller inspects, not an error — the allocator never partially commits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllocationOutcome {
    Committed,
    /// The edge that would have been oversubscribed.
    Rejected(EdgeId),
}

#[derive(Debug, Clone)]
struct FlowEntry {
    release_time: Time,
    path: Vec<NodeId>,
    size: f64,
}

impl PartialEq for FlowEntry {
    fn eq(&self, other: &Self) -> bool {
        self.release_time == other.release_time
    }
}
impl Eq for FlowEntry {}
impl PartialOrd for FlowEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FlowEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        OrderedFloat(self.release_time).cmp(&OrderedFloat(other.release_time))
    }
}

/// Per-view edge accounting: a dense `used` array plus the min-heap of
/// active flows that will eventually free it.
#[derive(Debug, Clone)]
pub struct EdgeLedger {
    used: Vec<f64>,
    flows: BinaryHeap<Reverse<FlowEntry>>,
    last_now: Option<Time>,
}

impl EdgeLedger {
    pub fn new(edge_count: usize) -> Self {
        Self {
            used: vec![0.0; edge_count],
            flows: BinaryHeap::new(),
            last_now: None,
        }
    }

    pub fn used(&self, edge: EdgeId) -> f64 {
        self.used[edge.index()]
    }

    /// Overwrites `used` directly, bypassing flow accounting. Used by
    /// `refresh_local_state` (polling) and plain (non-separate-state) sync.
    pub fn set_used(&mut self, edge: EdgeId, value: f64) {
        self.used[edge.index()] = value;
    }

    pub fn active_flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Every currently active flow's path and size, in no particular order —
    /// used by metrics sampling (e.g. summing ingress rate per switch).
    pub fn active_flows(&self) -> impl Iterator<Item = (&[NodeId], f64)> + '_ {
        self.flows.iter().map(|Reverse(f)| (f.path.as_slice(), f.size))
    }

    fn check_monotonic(&mut self, now: Time) -> Result<(), AllocatorError> {
        if let Some(last) = self.last_now {
            if now < last {
                return Err(AllocatorError::TimeNotMonotonic {
                    now,
                    last_now: last,
                });
            }
        }
        self.last_now = Some(now);
        Ok(())
    }

    fn path_edges(topology: &Topology, path: &[NodeId]) -> Vec<EdgeId> {
        path.windows(2)
            .map(|w| {
                topology
                    .edge_between(w[0], w[1])
                    .expect("path is not contiguous in the graph")
            })
            .collect()
    }

    /// Reserves `size` along every edge of `path`, scheduling the release
    /// at `now + duration`. Never partially commits: either every edge has
    /// headroom and all are updated, or none are.
    pub fn allocate(
        &mut self,
        topology: &Topology,
        path: &[NodeId],
        size: f64,
        now: Time,
        duration: f64,
    ) -> Result<AllocationOutcome, AllocatorError> {
        if path.len() < 2 {
            return Err(AllocatorError::EmptyPath);
        }
        if duration <= 0.0 {
            return Err(AllocatorError::NonPositiveDuration(duration));
        }
        self.check_monotonic(now)?;

        let edges = Self::path_edges(topology, path);
        for &edge in &edges {
            let cap = topology.capacity(edge);
            if self.used[edge.index()] + size > cap {
                info!(
                    edge = ?edge,
                    size,
                    now,
                    "allocation rejected, would oversubscribe edge"
                );
                return Ok(AllocationOutcome::Rejected(edge));
            }
        }
        for &edge in &edges {
            self.used[edge.index()] += size;
        }
        self.flows.push(Reverse(FlowEntry {
            release_time: now + duration,
            path: path.to_vec(),
            size,
        }));
        Ok(AllocationOutcome::Committed)
    }

    /// Releases every flow whose release time is at or before `now`.
    /// Total — never fails on a well-formed ledger. A subtraction that
    /// would drive `used` negative is logged and clamped at zero (this can
    /// legitimately happen on a controller view whose `used` was
    /// overwritten by a sync from a view that never saw the flow).
    pub fn free(&mut self, topology: &Topology, now: Time) -> Result<usize, AllocatorError> {
        self.check_monotonic(now)?;
        let mut freed = 0;
        while matches!(self.flows.peek(), Some(Reverse(f)) if f.release_time <= now) {
            let Reverse(entry) = self.flows.pop().expect("peeked Some above");
            for edge in Self::path_edges(topology, &entry.path) {
                let new_value = self.used[edge.index()] - entry.size;
                if new_value < 0.0 {
                    warn!(
                        edge = ?edge,
                        new_value,
                        now,
                        "over-free: clamping used to zero"
                    );
                }
                self.used[edge.index()] = new_value.max(0.0);
            }
            freed += 1;
        }
        Ok(freed)
    }
}
