//! The canonical workload wire format: an ordered sequence of timestamped
//! requests. Round-trips through `serde_json` for the `logs/<run>.workload`
//! / `.newworkload` dumps.

use serde::{Deserialize, Serialize};

/// One arriving request, in the canonical (as opposed to legacy-bucket)
/// form: `(arrival_time, switch, size, duration)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadRecord {
    pub arrival_time: f64,
    pub switch: String,
    pub size: f64,
    pub duration: u32,
}

/// A full canonical workload, ordered non-decreasing by `arrival_time` —
/// the invariant the scheduler's drain loop assumes.
pub type Workload = Vec<WorkloadRecord>;

pub fn is_ordered(workload: &[WorkloadRecord]) -> bool {
    workload
        .windows(2)
        .all(|w| w[0].arrival_time <= w[1].arrival_time)
}
