//! Configuration for the routing simulator

use dv_rust::{Cost, EngineConfig, NodeId, SimTime, Topology};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Configuration for a routing simulation
#[derive(Debug, Clone)]
pub struct RoutingSimConfig {
    /// Initial link costs
    pub topology: Topology,

    /// Packet delay model
    pub network: NetworkConfig,

    /// Per-engine protocol options
    pub engine: EngineConfig,

    /// Scheduled link-cost changes
    pub link_changes: LinkChangeSchedule,

    /// Stop processing events after this time even without quiescence
    pub max_time: SimTime,

    /// Random seed (None = generate random)
    pub seed: Option<[u8; 32]>,

    pub output: OutputConfig,
}

impl Default for RoutingSimConfig {
    fn default() -> Self {
        Self {
            topology: classic_topology(),
            network: NetworkConfig::default(),
            engine: EngineConfig::default(),
            link_changes: LinkChangeSchedule::default(),
            max_time: 100_000,
            seed: None,
            output: OutputConfig::default(),
        }
    }
}

impl RoutingSimConfig {
    /// Get or generate seed
    pub fn resolve_seed(&self) -> [u8; 32] {
        self.seed.unwrap_or_else(|| {
            let mut temp_rng = StdRng::from_entropy();
            let mut seed = [0u8; 32];
            use rand::RngCore;
            temp_rng.fill_bytes(&mut seed);
            seed
        })
    }
}

/// The three-router network of the classic link-cost-change exercise:
/// 0-1 cost 4, 0-2 cost 1, 1-2 cost 50
pub fn classic_topology() -> Topology {
    Topology::from_links(3, &[(0, 1, 4), (0, 2, 1), (1, 2, 50)])
        .expect("classic topology is valid")
}

/// Packet delay model. Every packet is delayed by a uniform random number of
/// ticks in `min_delay..=max_delay`; packets between the same ordered pair of
/// nodes never overtake each other.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub min_delay: SimTime,
    pub max_delay: SimTime,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            min_delay: 1,
            max_delay: 5,
        }
    }
}

/// Schedule of link-cost changes
#[derive(Debug, Clone, Default)]
pub struct LinkChangeSchedule {
    pub changes: Vec<LinkChange>,
}

impl LinkChangeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the cost of `a <-> b` at `time` (INFINITY takes the link down)
    pub fn at(mut self, time: SimTime, a: NodeId, b: NodeId, cost: Cost) -> Self {
        self.changes.push(LinkChange { time, a, b, cost });
        self
    }
}

/// A single scheduled link-cost change, applied to both endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkChange {
    pub time: SimTime,
    pub a: NodeId,
    pub b: NodeId,
    pub cost: Cost,
}

/// Configuration for output and logging
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Print every event (table dumps included) to the console
    pub enable_console: bool,

    /// CSV output file path
    pub csv_path: Option<String>,
}
