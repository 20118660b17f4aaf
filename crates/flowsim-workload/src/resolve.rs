//! Resolves canonical workload records (switches named by string) against a
//! concrete [`Topology`] into the [`Arrival`]s the scheduler consumes.

use flowsim_core::{Arrival, Topology, TopologyError};

use crate::record::WorkloadRecord;

pub fn resolve(topology: &Topology, records: &[WorkloadRecord]) -> Result<Vec<Arrival>, TopologyError> {
    records
        .iter()
        .map(|r| {
            let switch = topology.require_node(&r.switch)?;
            Ok(Arrival {
                time: r.arrival_time,
                switch,
                size: r.size,
                duration: r.duration as f64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::single_switch_two_servers;

    #[test]
    fn resolve_maps_switch_names_to_node_ids() {
        let (topo, _s1, _s2, sw1) = single_switch_two_servers(100.0).unwrap();
        let records = vec![WorkloadRecord {
            arrival_time: 0.0,
            switch: "sw1".to_string(),
            size: 1.0,
            duration: 2,
        }];
        let arrivals = resolve(&topo, &records).unwrap();
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].switch, sw1);
    }

    #[test]
    fn resolve_rejects_unknown_switch() {
        let (topo, ..) = single_switch_two_servers(100.0).unwrap();
        let records = vec![WorkloadRecord {
            arrival_time: 0.0,
            switch: "sw9".to_string(),
            size: 1.0,
            duration: 2,
        }];
        assert!(resolve(&topo, &records).is_err());
    }
}
