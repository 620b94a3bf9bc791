//! # dvRust - Distance-Vector Routing
//!
//! A Rust implementation of the distributed Bellman-Ford routing protocol with
//! poison reverse. Every node keeps its own belief of the cheapest cost to
//! every other node, exchanges distance vectors with its direct neighbours and
//! recomputes its routes until the network converges.
//!
//! ## Core Components
//!
//! - **DvEngine**: one node's protocol logic (initial announcement, received
//!   updates, link-cost changes, recompute and poison-reverse broadcast)
//! - **NodeState**: link costs, belief matrix and route table of a node
//! - **Topology**: the simulated network's link costs and a reference
//!   shortest-path computation
//!
//! ## Usage with a Network Layer
//!
//! This library is network-agnostic. You need to:
//! 1. Create a DvEngine for each node with its direct link costs
//! 2. Call `initialize` once per engine
//! 3. Deliver every RouterPacket the engines emit to `receive_update` of its
//!    destination, in order per (source, destination) pair, dropping packets
//!    to non-neighbours
//! 4. Feed link changes to `change_link_cost` on both endpoints
//!
//! ```no_run
//! use dv_rust::{DvEngine, RouterPacket, INFINITY};
//!
//! let mut node = DvEngine::new(0, &[0, 1, 4]);
//! let mut outgoing: Vec<RouterPacket> = Vec::new();
//! node.initialize(&mut outgoing);
//!
//! // In your network event loop:
//! // - node.receive_update(&packet, &mut outgoing) for each delivered packet
//! // - node.change_link_cost(neighbor, INFINITY, &mut outgoing) on link down
//! // - send outgoing packets via your network layer
//! ```
//!
//! ## Testing and Simulation
//!
//! A discrete-event simulator with YAML scenarios lives in `simulator/`
//! (binaries `scenario_runner` and `routing_sim`).

pub mod dv_engine;
pub mod dv_interface;
pub mod dv_node_state;
pub mod dv_topology;

// Re-export commonly used types
pub use dv_engine::{DvEngine, EngineConfig};
pub use dv_interface::{
    saturating_cost_add, Clock, Cost, Event, EventSink, FixedClock, NoOpSink, NodeId,
    RouterPacket, SharedClock, SimTime, Transport, INFINITY,
};
pub use dv_node_state::{NodeState, Snapshot};
pub use dv_topology::{Topology, TopologyError};
