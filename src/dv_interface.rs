use std::cell::Cell;
use std::rc::Rc;

use crate::dv_node_state::Snapshot;

// all node identities are dense indices 0..N-1
pub type NodeId = usize;
pub type Cost = u32;

pub type SimTime = u64;

/// Reserved cost meaning "unreachable". Not arithmetic infinity: every finite
/// cost is strictly smaller, and sums saturate at this value.
pub const INFINITY: Cost = 999;

/// Add two costs, saturating at [`INFINITY`].
///
/// Any operand equal to (or above) the sentinel forces the result to the
/// sentinel, as does any finite sum that reaches it.
pub fn saturating_cost_add(a: Cost, b: Cost) -> Cost {
    if a >= INFINITY || b >= INFINITY {
        return INFINITY;
    }

    // both operands are below INFINITY, so this can not overflow a u32
    (a + b).min(INFINITY)
}

/// The opaque update message exchanged between routers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterPacket {
    pub source: NodeId,
    pub dest: NodeId,
    pub vector: Vec<Cost>,
}

impl RouterPacket {
    pub fn new(source: NodeId, dest: NodeId, vector: Vec<Cost>) -> Self {
        Self {
            source,
            dest,
            vector,
        }
    }
}

/// Outbound half of the network: the engine hands every update it produces
/// to a transport. Delay, ordering and dropping of packets to non-neighbours
/// are the transport's business.
pub trait Transport {
    fn send(&mut self, packet: RouterPacket);
}

/// A plain outbox. The caller drains it and delivers the packets.
impl Transport for Vec<RouterPacket> {
    fn send(&mut self, packet: RouterPacket) {
        self.push(packet);
    }
}

/// Read access to the simulated clock
pub trait Clock {
    fn now(&self) -> SimTime;
}

/// Clock frozen at a single instant (tests, standalone engines)
#[derive(Copy, Clone, Debug, Default)]
pub struct FixedClock(pub SimTime);

impl Clock for FixedClock {
    fn now(&self) -> SimTime {
        self.0
    }
}

/// Clock cell owned by a scheduler and read by every engine it drives.
///
/// Engines only read it; the scheduler advances it with [`SharedClock::set`].
#[derive(Clone, Debug, Default)]
pub struct SharedClock {
    time: Rc<Cell<SimTime>>,
}

impl SharedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, time: SimTime) {
        self.time.set(time);
    }
}

impl Clock for SharedClock {
    fn now(&self) -> SimTime {
        self.time.get()
    }
}

// ============================================================================
// Event Logging System
// ============================================================================

/// Events emitted by a routing engine for display and analysis
#[derive(Debug, Clone)]
pub enum Event {
    /// Distance vector received from a neighbour
    UpdateReceived { from: NodeId },
    /// Direct link cost changed
    LinkCostChanged {
        neighbor: NodeId,
        from: Cost,
        to: Cost,
    },
    /// Own cost or next hop towards a destination changed during recompute
    RouteChanged {
        dest: NodeId,
        cost: Cost,
        via: NodeId,
    },
    /// Distance vectors handed to the transport after a change
    UpdatesSent { count: usize },
    /// Full table dump, emitted after every operation to sinks that want tables
    DistanceTable { snapshot: Snapshot },
}

/// Trait for consuming events from a routing engine
pub trait EventSink {
    fn log(&mut self, time: SimTime, node: NodeId, event: Event);

    /// Whether this sink consumes [`Event::DistanceTable`]. Engines skip
    /// building the snapshot when it returns false.
    fn wants_tables(&self) -> bool {
        true
    }
}

/// No-op event sink for production use (no table snapshots are built)
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _time: SimTime, _node: NodeId, _event: Event) {
        // Intentionally empty - compiler should optimize this away
    }

    fn wants_tables(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_add_finite() {
        assert_eq!(saturating_cost_add(1, 2), 3);
        assert_eq!(saturating_cost_add(0, 0), 0);
    }

    #[test]
    fn test_saturating_add_infinity_operand() {
        assert_eq!(saturating_cost_add(INFINITY, 0), INFINITY);
        assert_eq!(saturating_cost_add(5, INFINITY), INFINITY);
        assert_eq!(saturating_cost_add(INFINITY, INFINITY), INFINITY);
    }

    #[test]
    fn test_saturating_add_clamps_large_sums() {
        assert_eq!(saturating_cost_add(600, 600), INFINITY);
        assert_eq!(saturating_cost_add(500, 499), INFINITY);
        assert_eq!(saturating_cost_add(500, 498), 998);
    }

    #[test]
    fn test_vec_transport_collects_packets() {
        let mut outbox: Vec<RouterPacket> = Vec::new();
        outbox.send(RouterPacket::new(0, 1, vec![0, 1]));
        outbox.send(RouterPacket::new(0, 2, vec![0, 1]));

        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox[1].dest, 2);
    }

    #[test]
    fn test_shared_clock_is_visible_through_clones() {
        let clock = SharedClock::new();
        let reader: Box<dyn Clock> = Box::new(clock.clone());

        assert_eq!(reader.now(), 0);
        clock.set(42);
        assert_eq!(reader.now(), 42);
    }
}
