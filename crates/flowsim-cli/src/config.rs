//! The CLI's run spec: a `toml`-deserializable `*Input` layer with
//! `Option<T>` fields and `#[serde(default)]`, resolved into a strict
//! internal config with numeric defaults — the same two-layer pattern as
//! `rist_bonding_core::config::BondingConfigInput` / `BondingConfig`.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown topology shape `{0}`, expected `single` or `trunk`")]
    UnknownTopologyShape(String),
    #[error("unknown controller kind `{0}`")]
    UnknownControllerKind(String),
    #[error("unknown workload kind `{0}`")]
    UnknownWorkloadKind(String),
    #[error("topology shape `{shape}` needs {expected} controller(s), got {got}")]
    ControllerCountMismatch {
        shape: &'static str,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TopologyInput {
    pub shape: Option<String>,
    pub server_capacity: Option<f64>,
    pub trunk_capacity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TopologyShape {
    Single,
    Trunk,
}

#[derive(Debug, Clone)]
pub struct TopologyConfig {
    pub shape: TopologyShape,
    pub server_capacity: f64,
    pub trunk_capacity: f64,
}

impl TopologyInput {
    fn resolve(self) -> Result<TopologyConfig, ConfigError> {
        let shape = match self.shape.as_deref().unwrap_or("single") {
            "single" => TopologyShape::Single,
            "trunk" => TopologyShape::Trunk,
            other => return Err(ConfigError::UnknownTopologyShape(other.to_string())),
        };
        Ok(TopologyConfig {
            shape,
            server_capacity: self.server_capacity.unwrap_or(100.0),
            trunk_capacity: self.trunk_capacity.unwrap_or(1001.0),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ControllerInput {
    pub kind: Option<String>,
    pub greedy_limit: Option<f64>,
    pub alpha: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub kind: flowsim_core::ControllerKind,
    pub seed: u64,
}

impl ControllerInput {
    fn resolve(self, index: usize) -> Result<ControllerConfig, ConfigError> {
        let kind = match self.kind.as_deref().unwrap_or("link-balancer") {
            "link-balancer" => flowsim_core::ControllerKind::LinkBalancer,
            "greedy-local" => flowsim_core::ControllerKind::GreedyLocal {
                greedy_limit: self.greedy_limit.unwrap_or(0.5),
            },
            "random" => flowsim_core::ControllerKind::RandomChoice,
            "separate-state" => flowsim_core::ControllerKind::SeparateState {
                alpha: self.alpha.unwrap_or(1.0),
            },
            other => return Err(ConfigError::UnknownControllerKind(other.to_string())),
        };
        Ok(ControllerConfig {
            kind,
            seed: self.seed.unwrap_or(index as u64 + 1),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WorkloadInput {
    pub kind: Option<String>,
    pub numreqs: Option<usize>,
    pub size: Option<f64>,
    pub duration: Option<u32>,
    pub period: Option<f64>,
    pub offset: Option<f64>,
    pub max_demand: Option<f64>,
    pub y_shift: Option<f64>,
    pub timesteps: Option<usize>,
    pub seed: Option<u64>,
    pub interarrival_rate: Option<f64>,
    pub duration_scale: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkloadKind {
    Unit,
    Random,
    Sawtooth,
    Wave,
    Poisson,
}

#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub kind: WorkloadKind,
    pub numreqs: usize,
    pub size: f64,
    pub duration: u32,
    pub period: f64,
    pub offset: f64,
    pub max_demand: f64,
    pub y_shift: f64,
    pub timesteps: usize,
    pub seed: u64,
    pub interarrival_rate: f64,
    pub duration_scale: f64,
}

impl WorkloadInput {
    fn resolve(self) -> Result<WorkloadConfig, ConfigError> {
        let kind = match self.kind.as_deref().unwrap_or("unit") {
            "unit" => WorkloadKind::Unit,
            "random" => WorkloadKind::Random,
            "sawtooth" => WorkloadKind::Sawtooth,
            "wave" => WorkloadKind::Wave,
            "poisson" => WorkloadKind::Poisson,
            other => return Err(ConfigError::UnknownWorkloadKind(other.to_string())),
        };
        Ok(WorkloadConfig {
            kind,
            numreqs: self.numreqs.unwrap_or(10),
            size: self.size.unwrap_or(1.0),
            duration: self.duration.unwrap_or(2),
            period: self.period.unwrap_or(8.0),
            offset: self.offset.unwrap_or(4.0),
            max_demand: self.max_demand.unwrap_or(2.0),
            y_shift: self.y_shift.unwrap_or(0.0),
            timesteps: self.timesteps.unwrap_or(32),
            seed: self.seed.unwrap_or(1),
            interarrival_rate: self.interarrival_rate.unwrap_or(0.5),
            duration_scale: self.duration_scale.unwrap_or(2.0),
        })
    }
}

/// Top-level TOML run spec. `sync_period`'s three states: the key absent
/// means "never sync", `0` means "sync every arrival", `n > 0` means
/// periodic with phase preservation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RunConfigInput {
    pub run_name: Option<String>,
    pub topology: TopologyInput,
    pub controllers: Vec<ControllerInput>,
    pub workload: WorkloadInput,
    pub sync_period: Option<u64>,
    pub step_size: Option<f64>,
    pub ignore_remaining: Option<bool>,
    pub staleness: Option<usize>,
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub run_name: String,
    pub topology: TopologyConfig,
    pub controllers: Vec<ControllerConfig>,
    pub workload: WorkloadConfig,
    pub sync_period: Option<u64>,
    pub step_size: f64,
    pub ignore_remaining: bool,
    pub staleness: usize,
    pub out_dir: PathBuf,
}

impl RunConfigInput {
    pub fn resolve(self) -> Result<RunConfig, ConfigError> {
        let topology = self.topology.resolve()?;
        let expected = match topology.shape {
            TopologyShape::Single => 1,
            TopologyShape::Trunk => 2,
        };
        let controller_inputs = if self.controllers.is_empty() {
            (0..expected).map(|_| ControllerInput::default()).collect()
        } else {
            self.controllers
        };
        if controller_inputs.len() != expected {
            let shape = match topology.shape {
                TopologyShape::Single => "single",
                TopologyShape::Trunk => "trunk",
            };
            return Err(ConfigError::ControllerCountMismatch {
                shape,
                expected,
                got: controller_inputs.len(),
            });
        }
        let controllers = controller_inputs
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.resolve(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RunConfig {
            run_name: self.run_name.unwrap_or_else(|| "run".to_string()),
            topology,
            controllers,
            workload: self.workload.resolve()?,
            sync_period: self.sync_period,
            step_size: self.step_size.unwrap_or(1.0),
            ignore_remaining: self.ignore_remaining.unwrap_or(false),
            staleness: self.staleness.unwrap_or(0),
            out_dir: self.out_dir.unwrap_or_else(|| PathBuf::from("logs")),
        })
    }

    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let cfg = RunConfigInput::from_toml_str("").unwrap().resolve().unwrap();
        assert_eq!(cfg.run_name, "run");
        assert_eq!(cfg.controllers.len(), 1);
        assert!(cfg.sync_period.is_none());
    }

    #[test]
    fn trunk_topology_requires_two_controllers() {
        let toml = r#"
            [topology]
            shape = "trunk"
        "#;
        let err = RunConfigInput::from_toml_str(toml)
            .unwrap()
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ControllerCountMismatch { .. }));
    }

    #[test]
    fn sync_period_zero_is_distinct_from_absent() {
        let every = RunConfigInput::from_toml_str("sync_period = 0")
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(every.sync_period, Some(0));
        let never = RunConfigInput::from_toml_str("").unwrap().resolve().unwrap();
        assert_eq!(never.sync_period, None);
    }

    #[test]
    fn unknown_controller_kind_is_rejected() {
        let toml = r#"
            [[controllers]]
            kind = "quantum"
        "#;
        let err = RunConfigInput::from_toml_str(toml)
            .unwrap()
            .resolve()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownControllerKind("quantum".to_string()));
    }
}
