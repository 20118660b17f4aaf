//! Discrete-event simulator evaluating SDN-style load-balancing controllers.
//!
//! - [`topology`] — the immutable switch/server graph
//! - [`ledger`] — per-view resource accounting (allocate/free)
//! - [`view`] — a controller's private copy of the graph plus the sync
//!   protocol between views
//! - [`path`] — path enumeration and the shared feasibility/metric logic
//! - [`controller`] — the four routing policy variants and their shared
//!   `Controller` wrapper
//! - [`scheduler`] — the simulation loop
//! - [`metrics`] — RMSE, pairwise view distance, and the diagnostic trace

pub mod controller;
pub mod ledger;
pub mod metrics;
pub mod path;
pub mod scheduler;
pub mod topology;
pub mod view;

pub use controller::{Controller, ControllerKind};
pub use ledger::{AllocationOutcome, AllocatorError, EdgeLedger, Time};
pub use metrics::MetricsSeries;
pub use scheduler::{Arrival, Simulation, SimulationConfig, SimulationError};
pub use topology::{EdgeId, NodeId, NodeKind, Topology, TopologyError};
pub use view::ControllerView;

/// Installs a default `tracing` subscriber (env-filter based) if no
/// subscriber is already set. Safe to call multiple times. Controlled by
/// `RUST_LOG` (e.g. `RUST_LOG=flowsim_core=debug`).
pub fn init() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if tracing::dispatcher::has_been_set() {
            tracing::info!("flowsim-core: tracing subscriber already set");
            return;
        }
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_target(true)
            .compact()
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::info!("flowsim-core initialized");
        }
    });
}
