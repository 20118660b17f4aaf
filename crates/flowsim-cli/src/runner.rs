//! Wires a resolved [`RunConfig`] into a concrete topology, controller set,
//! and workload, then drives the simulation to completion.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use flowsim_core::{Controller, Simulation, SimulationConfig};
use flowsim_workload::{legacy_to_canonical, resolve, Waveform, Workload};

use crate::config::{RunConfig, TopologyShape, WorkloadKind};

/// The canonical workload actually run, plus — only when a legacy bucket
/// form was generated along the way — its pre-conversion shape, so the CLI
/// can dump `.newworkload` only when a conversion actually happened.
pub struct PreparedWorkload {
    pub canonical: Workload,
    pub was_legacy: bool,
}

fn switch_names(shape: TopologyShape) -> Vec<String> {
    match shape {
        TopologyShape::Single => vec!["sw1".to_string()],
        TopologyShape::Trunk => vec!["sw1".to_string(), "sw2".to_string()],
    }
}

fn build_workload(config: &RunConfig) -> Result<PreparedWorkload> {
    let switches = switch_names(config.topology.shape);
    let w = &config.workload;
    match w.kind {
        WorkloadKind::Unit => Ok(PreparedWorkload {
            canonical: flowsim_workload::generator::unit_workload(&switches, w.size, w.duration, w.numreqs),
            was_legacy: false,
        }),
        WorkloadKind::Random => Ok(PreparedWorkload {
            canonical: flowsim_workload::generator::random_workload(
                &switches,
                (w.size, w.size * 2.0),
                (w.duration, w.duration.max(1)),
                w.numreqs,
                w.seed,
            ),
            was_legacy: false,
        }),
        WorkloadKind::Sawtooth | WorkloadKind::Wave => {
            if switches.len() != 2 {
                return Err(anyhow!(
                    "sawtooth/wave workloads need a two-switch topology (`trunk`), got {} switch(es)",
                    switches.len()
                ));
            }
            let waveform = if w.kind == WorkloadKind::Wave {
                Waveform::Wave
            } else {
                Waveform::Sawtooth
            };
            let buckets = flowsim_workload::generator::dual_offset_workload(
                [switches[0].clone(), switches[1].clone()],
                w.period,
                w.offset,
                w.max_demand,
                w.size,
                w.duration,
                w.timesteps,
                waveform,
                w.y_shift,
            );
            Ok(PreparedWorkload {
                canonical: legacy_to_canonical(&buckets),
                was_legacy: true,
            })
        }
        WorkloadKind::Poisson => Ok(PreparedWorkload {
            canonical: flowsim_workload::generator::poisson_workload(
                &switches,
                w.timesteps as f64,
                w.interarrival_rate,
                w.duration_scale,
                w.size,
                w.seed,
            ),
            was_legacy: false,
        }),
    }
}

/// Runs `config` end to end: builds the topology and controllers, generates
/// and resolves the workload, and executes the simulation. Returns the
/// prepared workload (for the `.workload`/`.newworkload` dumps) alongside
/// the sampled metrics.
pub fn run(config: &RunConfig) -> Result<(PreparedWorkload, flowsim_core::MetricsSeries)> {
    let prepared = build_workload(config)?;
    anyhow::ensure!(
        flowsim_workload::is_ordered(&prepared.canonical),
        "generated workload is not ordered non-decreasing by arrival_time"
    );

    let (topology, controllers) = match config.topology.shape {
        TopologyShape::Single => {
            let (topo, _s1, _s2, sw1) =
                flowsim_workload::topology::single_switch_two_servers(config.topology.server_capacity)
                    .context("building single-switch topology")?;
            let topo = Arc::new(topo);
            let ctrl = Controller::new(
                "a",
                Arc::clone(&topo),
                vec![sw1],
                config.controllers[0].kind.clone(),
                config.controllers[0].seed,
            );
            (topo, vec![ctrl])
        }
        TopologyShape::Trunk => {
            let (topo, _s1, _s2, sw1, sw2) = flowsim_workload::topology::two_switch_trunk(
                config.topology.server_capacity,
                config.topology.trunk_capacity,
            )
            .context("building two-switch trunk topology")?;
            let topo = Arc::new(topo);
            let a = Controller::new(
                "a",
                Arc::clone(&topo),
                vec![sw1],
                config.controllers[0].kind.clone(),
                config.controllers[0].seed,
            );
            let b = Controller::new(
                "b",
                Arc::clone(&topo),
                vec![sw2],
                config.controllers[1].kind.clone(),
                config.controllers[1].seed,
            );
            (topo, vec![a, b])
        }
    };

    let arrivals = resolve(&topology, &prepared.canonical).context("resolving workload switch names")?;

    let sim_config = SimulationConfig {
        sync_period: config.sync_period,
        step_size: config.step_size,
        ignore_remaining: config.ignore_remaining,
        staleness: config.staleness,
    };
    let mut sim = Simulation::new(topology, controllers, sim_config).context("validating topology/controller ownership")?;
    let metrics = sim.run(arrivals).context("running simulation")?;

    Ok((prepared, metrics))
}
