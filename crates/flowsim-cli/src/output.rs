//! Persists `logs/<run_name>.{workload,newworkload,metrics}`. Metrics are
//! written as sorted-key JSON: [`flowsim_core::MetricsSeries`]'s field
//! order already matches, but we still route it through a `BTreeMap` so
//! the guarantee doesn't depend on struct field order.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use flowsim_core::MetricsSeries;
use flowsim_workload::WorkloadRecord;

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing to JSON")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

pub fn write_run(
    out_dir: &Path,
    run_name: &str,
    workload: &[WorkloadRecord],
    newworkload: Option<&[WorkloadRecord]>,
    metrics: &MetricsSeries,
) -> Result<()> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    write_json(&out_dir.join(format!("{run_name}.workload")), &workload)?;

    if let Some(newworkload) = newworkload {
        write_json(&out_dir.join(format!("{run_name}.newworkload")), &newworkload)?;
    }

    let sorted: BTreeMap<&str, serde_json::Value> = [
        ("rmse_links", serde_json::to_value(&metrics.rmse_links)?),
        ("rmse_servers", serde_json::to_value(&metrics.rmse_servers)?),
        ("state_distances", serde_json::to_value(&metrics.state_distances)?),
        ("simulation_trace", serde_json::to_value(&metrics.simulation_trace)?),
    ]
    .into_iter()
    .collect();
    write_json(&out_dir.join(format!("{run_name}.metrics")), &sorted)?;

    Ok(())
}
