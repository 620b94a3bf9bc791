//! YAML scenario files for the routing simulator
//!
//! ```yaml
//! meta:
//!   name: Triangle
//! config:
//!   costs:            # ~ = no link
//!     - [0, 1, 4]
//!     - [1, 0, 1]
//!     - [4, 1, 0]
//!   poison_reverse: true
//!   network: { min_delay: 1, max_delay: 5 }
//! link_changes:
//!   - { time: 40, a: 0, b: 1, cost: ~ }
//! output:
//!   csv_path: triangle.csv
//! expect:
//!   converged: true
//! ```

use super::config::{LinkChange, LinkChangeSchedule, RoutingSimConfig};
use super::stats::SimResult;
use dv_rust::{Cost, EngineConfig, NodeId, SimTime, Topology, TopologyError, INFINITY};
use std::fmt;
use std::fs;
use std::path::Path;

/// Errors raised while loading, building or checking a scenario
#[derive(Debug)]
pub enum ScenarioError {
    /// Scenario file could not be read
    Io { path: String, message: String },

    /// YAML did not match the scenario format
    Parse(String),

    /// Link costs or link changes are not a valid network
    Topology(TopologyError),

    /// The run did not meet the scenario's `expect` section
    Expectation(String),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::Io { path, message } => write!(f, "failed to read {}: {}", path, message),
            ScenarioError::Parse(msg) => write!(f, "invalid scenario: {}", msg),
            ScenarioError::Topology(e) => write!(f, "invalid topology: {}", e),
            ScenarioError::Expectation(msg) => write!(f, "expectation failed: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioError {}

impl From<TopologyError> for ScenarioError {
    fn from(e: TopologyError) -> Self {
        ScenarioError::Topology(e)
    }
}

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
pub struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    pub meta: ScenarioMeta,

    pub config: ScenarioConfig,

    #[serde(default)]
    pub link_changes: Vec<LinkChangeEntry>,

    #[serde(default)]
    pub output: Option<OutputOverrides>,

    #[serde(default)]
    pub expect: Option<Expectations>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hypothesis: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ScenarioConfig {
    /// Square, symmetric link-cost matrix; `~` marks a missing link
    pub costs: Vec<Vec<Option<Cost>>>,

    #[serde(default = "default_poison_reverse")]
    pub poison_reverse: bool,

    #[serde(default)]
    pub max_time: Option<SimTime>,

    #[serde(default)]
    pub network: Option<NetworkOverrides>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct NetworkOverrides {
    pub min_delay: Option<SimTime>,
    pub max_delay: Option<SimTime>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct OutputOverrides {
    pub console: Option<bool>,
    pub csv_path: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct LinkChangeEntry {
    pub time: SimTime,
    pub a: NodeId,
    pub b: NodeId,
    /// `~` takes the link down
    pub cost: Option<Cost>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct Expectations {
    pub converged: Option<bool>,
    pub quiescent: Option<bool>,
}

fn default_poison_reverse() -> bool {
    true
}

fn link_cost(cost: Option<Cost>) -> Cost {
    cost.unwrap_or(INFINITY)
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let yaml = fs::read_to_string(path).map_err(|e| ScenarioError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&yaml)
    }

    pub fn parse(yaml: &str) -> Result<Self, ScenarioError> {
        serde_yaml::from_str(yaml).map_err(|e| ScenarioError::Parse(e.to_string()))
    }

    /// Build the simulator configuration; `seed` overrides a random seed
    pub fn to_config(&self, seed: Option<[u8; 32]>) -> Result<RoutingSimConfig, ScenarioError> {
        let costs = self
            .config
            .costs
            .iter()
            .map(|row| row.iter().map(|c| link_cost(*c)).collect())
            .collect();

        let mut config = RoutingSimConfig {
            topology: Topology::from_matrix(costs)?,
            engine: EngineConfig {
                poison_reverse: self.config.poison_reverse,
            },
            seed,
            ..Default::default()
        };

        if let Some(max_time) = self.config.max_time {
            config.max_time = max_time;
        }

        // Apply network config overrides
        if let Some(ref net) = self.config.network {
            if let Some(v) = net.min_delay {
                config.network.min_delay = v;
            }
            if let Some(v) = net.max_delay {
                config.network.max_delay = v;
            }
        }

        if let Some(ref output) = self.output {
            if let Some(v) = output.console {
                config.output.enable_console = v;
            }
            if output.csv_path.is_some() {
                config.output.csv_path = output.csv_path.clone();
            }
        }

        let mut schedule = LinkChangeSchedule::new();
        for entry in &self.link_changes {
            let change = LinkChange {
                time: entry.time,
                a: entry.a,
                b: entry.b,
                cost: link_cost(entry.cost),
            };
            config.topology.check_link(change.a, change.b, change.cost)?;
            schedule.changes.push(change);
        }
        config.link_changes = schedule;

        Ok(config)
    }

    /// Compare a finished run against the `expect` section
    pub fn check(&self, result: &SimResult) -> Result<(), ScenarioError> {
        let expect = match self.expect {
            Some(ref expect) => expect,
            None => return Ok(()),
        };

        if let Some(converged) = expect.converged {
            if converged != result.convergence.converged {
                return Err(ScenarioError::Expectation(format!(
                    "converged = {}, expected {}",
                    result.convergence.converged, converged
                )));
            }
        }

        if let Some(quiescent) = expect.quiescent {
            if quiescent != result.quiescent {
                return Err(ScenarioError::Expectation(format!(
                    "quiescent = {}, expected {}",
                    result.quiescent, quiescent
                )));
            }
        }

        Ok(())
    }
}
