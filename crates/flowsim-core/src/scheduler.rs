//! The discrete-event simulation loop: advances simulated time, frees
//! expired flows, refreshes and syncs controller views, dispatches arriving
//! requests, and samples metrics at tick boundaries.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use thiserror::Error;

use crate::controller::Controller;
use crate::ledger::{AllocatorError, EdgeLedger};
use crate::metrics::{rmse_links, rmse_servers, sample_trace, view_distance, MetricsSeries};
use crate::topology::{NodeId, Topology};

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("switch `{0}` is governed by more than one controller")]
    SwitchOwnedTwice(String),
    #[error("switch `{0}` is not governed by any controller")]
    SwitchUnowned(String),
}

/// One arriving request: `(arrival_time, switch, size, duration)` already
/// resolved to a topology node id.
#[derive(Debug, Clone, Copy)]
pub struct Arrival {
    pub time: f64,
    pub switch: NodeId,
    pub size: f64,
    pub duration: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// `Some(0)` syncs every arrival; `Some(n)` with `n > 0` syncs every `n`
    /// ticks of elapsed time with phase preservation; `None` never syncs.
    pub sync_period: Option<u64>,
    pub step_size: f64,
    pub ignore_remaining: bool,
    /// Ticks by which each controller's `refresh_local_state` sees a past
    /// snapshot of the physical graph rather than its current state.
    pub staleness: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sync_period: None,
            step_size: 1.0,
            ignore_remaining: false,
            staleness: 0,
        }
    }
}

fn sync_all_pairs(controllers: &mut [Controller], timestep: u64) {
    let n = controllers.len();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (lo, hi) = if i < j { (i, j) } else { (j, i) };
            let (left, right) = controllers.split_at_mut(hi);
            if i < j {
                left[lo].sync_toward(&mut right[0], None, timestep);
            } else {
                right[0].sync_toward(&mut left[lo], None, timestep);
            }
        }
    }
}

/// Owns the physical graph, the set of controllers, and drives the whole
/// simulation. Controllers never hold references to their peers; all
/// cross-controller interaction is brokered here.
pub struct Simulation {
    topology: Arc<Topology>,
    physical: EdgeLedger,
    controllers: Vec<Controller>,
    switch_owner: HashMap<NodeId, usize>,
    servers: Vec<NodeId>,
    config: SimulationConfig,
    snapshots: VecDeque<EdgeLedger>,
}

impl Simulation {
    pub fn new(
        topology: Arc<Topology>,
        controllers: Vec<Controller>,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let mut switch_owner = HashMap::new();
        for (idx, ctrl) in controllers.iter().enumerate() {
            for &sw in ctrl.switches() {
                if switch_owner.insert(sw, idx).is_some() {
                    return Err(SimulationError::SwitchOwnedTwice(topology.name(sw).to_string()));
                }
            }
        }
        for sw in topology.switches() {
            if !switch_owner.contains_key(&sw) {
                return Err(SimulationError::SwitchUnowned(topology.name(sw).to_string()));
            }
        }

        let physical = EdgeLedger::new(topology.edge_count());
        let servers: Vec<NodeId> = topology.servers().collect();
        Ok(Self {
            topology,
            physical,
            controllers,
            switch_owner,
            servers,
            config,
            snapshots: VecDeque::new(),
        })
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn physical(&self) -> &EdgeLedger {
        &self.physical
    }

    fn snapshot_source(&self) -> EdgeLedger {
        if self.config.staleness == 0 {
            return self.physical.clone();
        }
        self.snapshots
            .front()
            .cloned()
            .unwrap_or_else(|| self.physical.clone())
    }

    /// Pushes a fresh snapshot of the physical graph, bounding the queue to
    /// `staleness + 1` entries so it never grows without limit.
    fn push_snapshot(&mut self) {
        if self.config.staleness == 0 {
            return;
        }
        self.snapshots.push_back(self.physical.clone());
        while self.snapshots.len() > self.config.staleness + 1 {
            self.snapshots.pop_front();
        }
    }

    fn sample(&mut self, time: f64, metrics: &mut MetricsSeries) {
        let links = rmse_links(&self.topology, &self.physical);
        let servers = rmse_servers(&self.topology, &self.physical);

        let state_distances = if self.controllers.len() == 2 {
            let a = self.controllers[0].view().ledger();
            let b = self.controllers[1].view().ledger();
            vec![
                view_distance(&self.topology, a, b),
                view_distance(&self.topology, a, &self.physical),
                view_distance(&self.topology, b, &self.physical),
            ]
        } else {
            Vec::new()
        };

        let named: Vec<(&str, &EdgeLedger)> = self
            .controllers
            .iter()
            .map(|c| (c.name(), c.view().ledger()))
            .collect();
        let trace = sample_trace(&self.topology, time, &self.physical, &named);

        metrics.push(links, servers, state_distances, trace);
    }

    /// Runs the simulation to completion over `workload` (assumed ordered
    /// non-decreasing by arrival time), returning the sampled metric series.
    /// Ordering within a single arrival's processing: frees precede
    /// refreshes, refreshes precede sync, sync precedes dispatch; metric
    /// sampling happens once per tick after every arrival at or before it
    /// has been drained.
    pub fn run(&mut self, workload: Vec<Arrival>) -> Result<MetricsSeries, AllocatorError> {
        let mut workload: VecDeque<Arrival> = workload.into();
        let mut metrics = MetricsSeries::default();
        let mut time_now: f64 = 0.0;
        let mut last_sync: f64 = 0.0;
        let mut timestep: u64 = 0;

        if self.config.staleness > 0 {
            self.snapshots.push_back(self.physical.clone());
        }

        while !workload.is_empty() {
            while let Some(next) = workload.front() {
                if next.time > time_now {
                    break;
                }
                let arrival = workload.pop_front().expect("front() just returned Some");

                self.physical.free(&self.topology, arrival.time)?;
                for ctrl in self.controllers.iter_mut() {
                    ctrl.free(arrival.time)?;
                }

                let source = self.snapshot_source();
                for ctrl in self.controllers.iter_mut() {
                    ctrl.refresh_local_state(&source);
                }

                if let Some(period) = self.config.sync_period {
                    let due = period == 0 || arrival.time - last_sync >= period as f64;
                    if due {
                        sync_all_pairs(&mut self.controllers, timestep);
                        last_sync = if period == 0 {
                            arrival.time
                        } else {
                            arrival.time - ((arrival.time - last_sync) % period as f64)
                        };
                    }
                }

                let owner_idx = *self
                    .switch_owner
                    .get(&arrival.switch)
                    .expect("every switch's owner was validated at construction");
                let path = self.controllers[owner_idx].handle_request(
                    &self.servers,
                    arrival.switch,
                    arrival.size,
                    arrival.time,
                    arrival.duration,
                )?;
                if let Some(path) = path {
                    self.physical
                        .allocate(&self.topology, &path, arrival.size, arrival.time, arrival.duration)?;
                }

                self.push_snapshot();
                timestep += 1;
            }
            self.sample(time_now, &mut metrics);
            time_now += self.config.step_size;
        }

        if !self.config.ignore_remaining {
            while self.physical.active_flow_count() > 0 {
                self.physical.free(&self.topology, time_now)?;
                let source = self.physical.clone();
                for ctrl in self.controllers.iter_mut() {
                    ctrl.refresh_local_state(&source);
                }
                self.sample(time_now, &mut metrics);
                time_now += self.config.step_size;
            }
        }

        Ok(metrics)
    }
}
