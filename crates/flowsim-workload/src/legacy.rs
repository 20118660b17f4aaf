//! The legacy sequence-of-buckets workload form and its conversion to
//! canonical records. Bucket `i` holds every `(switch, size, duration)`
//! tuple arriving "during" timestep `i`; conversion spreads them out to
//! fractional arrival times so requests within a tick still have a strict
//! order.

use crate::record::{Workload, WorkloadRecord};

/// One timestep's worth of legacy requests: `(switch, size, duration)`.
pub type LegacyBucket = Vec<(String, f64, u32)>;

/// Converts bucket `i` of length `k` into canonical records at arrival
/// times `i + (j+1)*0.5/k` for `j in [0, k)`. Preserves total request
/// count; within a bucket, arrival times are strictly increasing.
pub fn legacy_to_canonical(buckets: &[LegacyBucket]) -> Workload {
    let mut out = Vec::new();
    for (i, bucket) in buckets.iter().enumerate() {
        let k = bucket.len();
        for (j, (switch, size, duration)) in bucket.iter().enumerate() {
            let frac = (j as f64 + 1.0) * 0.5 / k as f64;
            out.push(WorkloadRecord {
                arrival_time: i as f64 + frac,
                switch: switch.clone(),
                size: *size,
                duration: *duration,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_request_count_and_within_tick_ordering() {
        let buckets: Vec<LegacyBucket> = vec![
            vec![
                ("sw1".into(), 1.0, 2),
                ("sw1".into(), 1.0, 2),
                ("sw2".into(), 1.0, 2),
            ],
            vec![("sw1".into(), 2.0, 1)],
            vec![],
        ];
        let total: usize = buckets.iter().map(|b| b.len()).sum();
        let canonical = legacy_to_canonical(&buckets);
        assert_eq!(canonical.len(), total);

        let first_tick: Vec<f64> = canonical
            .iter()
            .filter(|r| r.arrival_time < 1.0)
            .map(|r| r.arrival_time)
            .collect();
        assert_eq!(first_tick.len(), 3);
        assert!(first_tick.windows(2).all(|w| w[0] < w[1]));
        assert!(first_tick.iter().all(|&t| (0.0..1.0).contains(&t)));
    }

    #[test]
    fn single_element_bucket_lands_at_midpoint() {
        let buckets: Vec<LegacyBucket> = vec![vec![("sw1".into(), 5.0, 3)]];
        let canonical = legacy_to_canonical(&buckets);
        assert_eq!(canonical.len(), 1);
        assert!((canonical[0].arrival_time - 0.5).abs() < 1e-12);
    }
}
