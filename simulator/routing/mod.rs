//! Routing simulator module
//!
//! Drives one distance-vector engine per node through a discrete-event
//! network:
//! - a virtual clock shared with every engine
//! - random per-packet delay with FIFO delivery per directed pair
//! - scheduled link-cost changes applied to both endpoints
//! - convergence check against the topology's shortest paths

pub mod config;
pub mod event_sinks;
pub mod runner;
pub mod scenario;
pub mod stats;

pub use config::{LinkChange, LinkChangeSchedule, NetworkConfig, OutputConfig, RoutingSimConfig};
pub use runner::RoutingRunner;
pub use scenario::{ScenarioError, ScenarioFile};
pub use stats::{ConvergenceReport, MessageStats, SimResult};
