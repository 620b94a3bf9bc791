use log::{debug, trace};

use crate::dv_interface::{
    saturating_cost_add, Clock, Cost, Event, EventSink, FixedClock, NoOpSink, NodeId,
    RouterPacket, Transport, INFINITY,
};
use crate::dv_node_state::{NodeState, Snapshot};

/// Configuration for a routing engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Report INFINITY to a neighbour for every destination routed through it
    /// (default: true). Turning it off gives plain distance-vector behaviour,
    /// count-to-infinity included.
    pub poison_reverse: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poison_reverse: true,
        }
    }
}

/// Distance-vector routing for a single node.
///
/// The engine is driven from outside: a scheduler delivers packets through
/// [`DvEngine::receive_update`] and link changes through
/// [`DvEngine::change_link_cost`]. Everything the engine wants to send goes to
/// the [`Transport`] passed into each call.
pub struct DvEngine {
    state: NodeState,
    config: EngineConfig,
    initialized: bool,
    clock: Box<dyn Clock>,
    event_sink: Box<dyn EventSink>,
}

impl DvEngine {
    /// Create an engine with default config, a frozen clock and NoOpSink
    pub fn new(my_id: NodeId, direct_costs: &[Cost]) -> Self {
        Self::new_with(
            my_id,
            direct_costs,
            EngineConfig::default(),
            Box::new(FixedClock::default()),
            Box::new(NoOpSink),
        )
    }

    /// Create an engine with injected clock and event sink
    pub fn new_with(
        my_id: NodeId,
        direct_costs: &[Cost],
        config: EngineConfig,
        clock: Box<dyn Clock>,
        event_sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            state: NodeState::new(my_id, direct_costs),
            config,
            initialized: false,
            clock,
            event_sink,
        }
    }

    pub fn my_id(&self) -> NodeId {
        self.state.my_id()
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Announce the initial link costs to every other node.
    ///
    /// Must be called exactly once, before the node takes part in the
    /// exchange. Packets to non-neighbours are left for the transport to drop.
    pub fn initialize(&mut self, transport: &mut dyn Transport) {
        assert!(
            !self.initialized,
            "node {} initialized twice",
            self.my_id()
        );
        self.initialized = true;

        self.log_table();

        let my_id = self.my_id();
        for dest in (0..self.state.len()).filter(|dest| *dest != my_id) {
            transport.send(RouterPacket::new(
                my_id,
                dest,
                self.state.link_costs().to_vec(),
            ));
        }
    }

    /// Handle a distance vector delivered by the transport.
    ///
    /// Returns whether the node's own distance vector (or routes) changed, in
    /// which case updates have been sent to all other nodes.
    pub fn receive_update(&mut self, packet: &RouterPacket, transport: &mut dyn Transport) -> bool {
        let my_id = self.my_id();
        assert_eq!(
            packet.dest, my_id,
            "packet for node {} delivered to node {}",
            packet.dest, my_id
        );
        assert_ne!(packet.source, my_id, "node {} received its own update", my_id);

        self.log(Event::UpdateReceived {
            from: packet.source,
        });

        self.state.replace_belief_row(packet.source, &packet.vector);

        self.recompute_and_broadcast(transport)
    }

    /// Apply a new direct link cost (INFINITY for link down).
    ///
    /// Returns whether the node's routes changed.
    pub fn change_link_cost(
        &mut self,
        neighbor: NodeId,
        new_cost: Cost,
        transport: &mut dyn Transport,
    ) -> bool {
        assert_ne!(neighbor, self.my_id(), "node {} has no link to itself", neighbor);

        let old_cost = self.state.set_link_cost(neighbor, new_cost.min(INFINITY));
        self.log(Event::LinkCostChanged {
            neighbor,
            from: old_cost,
            to: new_cost.min(INFINITY),
        });

        self.recompute_and_broadcast(transport)
    }

    /// Read-only copy of the tables for observers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.state, self.clock.now())
    }

    fn recompute_and_broadcast(&mut self, transport: &mut dyn Transport) -> bool {
        let changed = self.recompute();

        self.log_table();

        if changed {
            self.broadcast(transport);
        }

        changed
    }

    /// One Bellman-Ford relaxation pass over all destinations.
    ///
    /// For every destination the cheapest reachable neighbour wins; on a tie
    /// the current next hop is kept, otherwise the lowest neighbour index.
    /// A destination changes when its cost changes or when its current next
    /// hop no longer offers the best cost. Returns whether anything changed.
    ///
    /// A single pass only: convergence comes from the message exchange
    /// between nodes, never from looping here.
    pub fn recompute(&mut self) -> bool {
        let my_id = self.my_id();
        let mut changed = false;

        for dest in 0..self.state.len() {
            if dest == my_id {
                continue;
            }

            let current_via = self.state.next_hop(dest);
            let mut best_cost = INFINITY;
            let mut best_via = current_via;

            for via in 0..self.state.len() {
                let candidate = self.cost_via(via, dest);
                if candidate < best_cost {
                    best_cost = candidate;
                    best_via = via;
                }
            }

            // keep the current route while it still ties the best
            if best_cost != INFINITY && self.cost_via(current_via, dest) == best_cost {
                best_via = current_via;
            }

            let cost_changed = best_cost != self.state.belief(my_id, dest);
            let route_changed = best_cost != INFINITY && best_via != current_via;

            if cost_changed || route_changed {
                self.state.set_route(dest, best_cost, best_via);
                self.log(Event::RouteChanged {
                    dest,
                    cost: best_cost,
                    via: best_via,
                });
                changed = true;
            }
        }

        debug!(
            "node {} recompute: changed={} vector={:?}",
            my_id,
            changed,
            self.state.distance_vector()
        );

        changed
    }

    /// Cost of reaching `dest` through neighbour `via`, INFINITY when `via`
    /// is self or not directly reachable.
    fn cost_via(&self, via: NodeId, dest: NodeId) -> Cost {
        if via == self.my_id() {
            return INFINITY;
        }

        let link = self.state.link_cost(via);
        if link == INFINITY {
            return INFINITY;
        }

        saturating_cost_add(self.state.belief(via, dest), link)
    }

    /// The distance vector as it would be sent to `neighbor`
    pub fn outgoing_vector(&self, neighbor: NodeId) -> Vec<Cost> {
        let mut vector = self.state.distance_vector().to_vec();

        if self.config.poison_reverse {
            for (dest, cost) in vector.iter_mut().enumerate() {
                if self.state.next_hop(dest) == neighbor {
                    *cost = INFINITY;
                }
            }
        }

        vector
    }

    fn broadcast(&mut self, transport: &mut dyn Transport) {
        let my_id = self.my_id();
        let mut count = 0;

        for neighbor in (0..self.state.len()).filter(|n| *n != my_id) {
            let packet = RouterPacket::new(my_id, neighbor, self.outgoing_vector(neighbor));
            trace!("node {} -> {}: {:?}", my_id, neighbor, packet.vector);
            transport.send(packet);
            count += 1;
        }

        self.log(Event::UpdatesSent { count });
    }

    fn log(&mut self, event: Event) {
        self.event_sink.log(self.clock.now(), self.state.my_id(), event);
    }

    fn log_table(&mut self) {
        if !self.event_sink.wants_tables() {
            return;
        }
        let snapshot = self.snapshot();
        self.log(Event::DistanceTable { snapshot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dv_topology::Topology;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    const A: NodeId = 0;
    const B: NodeId = 1;
    const C: NodeId = 2;
    const INF: Cost = INFINITY;

    /// Sink that keeps every event, readable after the engine took ownership
    #[derive(Clone, Default)]
    struct TestSink {
        events: Rc<RefCell<Vec<Event>>>,
        skip_tables: bool,
    }

    impl EventSink for TestSink {
        fn log(&mut self, _time: u64, _node: NodeId, event: Event) {
            self.events.borrow_mut().push(event);
        }

        fn wants_tables(&self) -> bool {
            !self.skip_tables
        }
    }

    /// In-test stand-in for the simulator: one FIFO queue per directed pair,
    /// packets to self or non-neighbours dropped at the boundary
    struct TestNetwork {
        topology: Topology,
        engines: Vec<DvEngine>,
        queues: Vec<VecDeque<RouterPacket>>,
        delivered: usize,
    }

    impl TestNetwork {
        fn new(topology: Topology) -> Self {
            Self::with_config(topology, EngineConfig::default())
        }

        fn with_config(topology: Topology, config: EngineConfig) -> Self {
            let n = topology.len();
            let engines = (0..n)
                .map(|id| {
                    DvEngine::new_with(
                        id,
                        topology.link_costs(id),
                        config.clone(),
                        Box::new(FixedClock(0)),
                        Box::new(NoOpSink),
                    )
                })
                .collect();

            Self {
                topology,
                engines,
                queues: vec![VecDeque::new(); n * n],
                delivered: 0,
            }
        }

        fn enqueue(&mut self, outbox: Vec<RouterPacket>) {
            let n = self.topology.len();
            for packet in outbox {
                if packet.source == packet.dest
                    || !self.topology.is_neighbor(packet.source, packet.dest)
                {
                    continue;
                }
                self.queues[packet.source * n + packet.dest].push_back(packet);
            }
        }

        fn initialize(&mut self) {
            for id in 0..self.engines.len() {
                let mut outbox = Vec::new();
                self.engines[id].initialize(&mut outbox);
                self.enqueue(outbox);
            }
        }

        fn change_link(&mut self, a: NodeId, b: NodeId, cost: Cost) {
            self.topology.set_link(a, b, cost).unwrap();
            let mut outbox = Vec::new();
            self.engines[a].change_link_cost(b, cost, &mut outbox);
            self.engines[b].change_link_cost(a, cost, &mut outbox);
            self.enqueue(outbox);
        }

        /// Deliver the head of one pair queue; `None` when all queues are empty
        fn deliver_one(&mut self, pick: usize) -> Option<()> {
            let busy: Vec<usize> = (0..self.queues.len())
                .filter(|q| !self.queues[*q].is_empty())
                .collect();
            if busy.is_empty() {
                return None;
            }

            let queue = busy[pick % busy.len()];
            let packet = self.queues[queue].pop_front()?;
            let mut outbox = Vec::new();
            self.engines[packet.dest].receive_update(&packet, &mut outbox);
            self.delivered += 1;
            self.enqueue(outbox);
            Some(())
        }

        /// Run to quiescence, picking the next pair in round-robin order
        fn run(&mut self) {
            let mut step = 0;
            while self.deliver_one(step).is_some() {
                step += 1;
                assert!(step < 100_000, "no quiescence");
            }
        }

        /// Run to quiescence with a random (per-pair FIFO) interleaving
        fn run_shuffled(&mut self, seed: u64) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut steps = 0;
            while self.deliver_one(rng.gen_range(0..usize::MAX)).is_some() {
                steps += 1;
                assert!(steps < 100_000, "no quiescence");
            }
        }

        fn vector(&self, id: NodeId) -> Vec<Cost> {
            self.engines[id].state().distance_vector().to_vec()
        }

        fn assert_converged(&self) {
            let reference = self.topology.shortest_paths();
            for (id, engine) in self.engines.iter().enumerate() {
                for dest in 0..self.topology.len() {
                    if dest == id {
                        continue;
                    }
                    assert_eq!(
                        engine.state().belief(id, dest),
                        reference[id][dest],
                        "node {} to {}",
                        id,
                        dest
                    );
                }
            }
        }
    }

    fn triangle() -> Topology {
        Topology::from_links(3, &[(A, B, 1), (B, C, 1), (A, C, 4)]).unwrap()
    }

    fn five_nodes() -> Topology {
        Topology::from_links(
            5,
            &[(0, 1, 7), (0, 3, 2), (1, 2, 1), (1, 3, 3), (2, 4, 2), (3, 4, 9)],
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_announces_direct_costs_to_all_others() {
        let mut engine = DvEngine::new(B, &[1, 0, INF]);
        let mut outbox = Vec::new();
        engine.initialize(&mut outbox);

        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox[0], RouterPacket::new(B, A, vec![1, 0, INF]));
        assert_eq!(outbox[1], RouterPacket::new(B, C, vec![1, 0, INF]));
    }

    #[test]
    #[should_panic(expected = "initialized twice")]
    fn test_initialize_twice_panics() {
        let mut engine = DvEngine::new(A, &[0, 1]);
        let mut outbox = Vec::new();
        engine.initialize(&mut outbox);
        engine.initialize(&mut outbox);
    }

    #[test]
    fn test_triangle_routes_through_cheaper_path() {
        let mut engine = DvEngine::new(A, &[0, 1, 4]);
        let mut outbox = Vec::new();
        engine.initialize(&mut outbox);
        outbox.clear();

        let changed = engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, 1]), &mut outbox);

        assert!(changed);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.cost_to(C), 2);
        assert_eq!(snapshot.next_hop(C), Some(B));
        assert_eq!(snapshot.next_hop(B), Some(B));

        // one packet per non-self node
        assert_eq!(outbox.len(), 2);
    }

    #[test]
    fn test_triangle_converges() {
        let mut net = TestNetwork::new(triangle());
        net.initialize();
        net.run();

        net.assert_converged();
        let a = net.engines[A].snapshot();
        assert_eq!(a.cost_to(C), 2);
        assert_eq!(a.next_hop(C), Some(B));
    }

    #[test]
    fn test_converges_without_poison_reverse() {
        let mut net = TestNetwork::with_config(
            five_nodes(),
            EngineConfig {
                poison_reverse: false,
            },
        );
        net.initialize();
        net.run();

        net.assert_converged();
    }

    #[test]
    fn test_poison_reverse_on_outgoing_vectors() {
        let mut engine = DvEngine::new(A, &[0, 1, 4]);
        let mut outbox = Vec::new();
        engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, 1]), &mut outbox);

        // A routes to B and C through B: B hears INFINITY for both
        let to_b = outbox.iter().find(|p| p.dest == B).unwrap();
        assert_eq!(to_b.vector, vec![0, INF, INF]);

        let to_c = outbox.iter().find(|p| p.dest == C).unwrap();
        assert_eq!(to_c.vector, vec![0, 1, 2]);
    }

    #[test]
    fn test_no_poison_when_disabled() {
        let mut engine = DvEngine::new_with(
            A,
            &[0, 1, 4],
            EngineConfig {
                poison_reverse: false,
            },
            Box::new(FixedClock(0)),
            Box::new(NoOpSink),
        );
        let mut outbox = Vec::new();
        engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, 1]), &mut outbox);

        for packet in &outbox {
            assert_eq!(packet.vector, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_every_sent_vector_is_poisoned() {
        let mut net = TestNetwork::new(five_nodes());
        net.initialize();

        let mut step = 0;
        while net.deliver_one(step).is_some() {
            step += 1;
            for engine in &net.engines {
                let me = engine.my_id();
                for neighbor in (0..net.topology.len()).filter(|n| *n != me) {
                    let vector = engine.outgoing_vector(neighbor);
                    for dest in 0..vector.len() {
                        if engine.state().next_hop(dest) == neighbor {
                            assert_eq!(vector[dest], INF);
                        }
                    }
                }
            }
        }
        net.assert_converged();
    }

    #[test]
    fn test_recompute_never_touches_self() {
        let mut engine = DvEngine::new(A, &[0, 1, 4]);
        let mut outbox = Vec::new();
        // B claims A is far away and that it can reach itself for free
        engine.receive_update(&RouterPacket::new(B, A, vec![INF, 0, 1]), &mut outbox);
        engine.receive_update(&RouterPacket::new(C, A, vec![INF, 1, 0]), &mut outbox);

        assert_eq!(engine.state().belief(A, A), 0);
        assert_eq!(engine.state().next_hop(A), A);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut engine = DvEngine::new(A, &[0, 1, 4]);
        let mut outbox = Vec::new();
        engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, 1]), &mut outbox);
        engine.receive_update(&RouterPacket::new(C, A, vec![4, 1, 0]), &mut outbox);

        assert!(!engine.recompute());
        assert!(!engine.recompute());
    }

    #[test]
    fn test_recompute_matches_neighbor_minimum() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let costs: Vec<Cost> = (0..5)
                .map(|i| match i {
                    0 => 0,
                    _ if rng.gen_bool(0.3) => INF,
                    _ => rng.gen_range(1..20),
                })
                .collect();
            let mut engine = DvEngine::new(0, &costs);
            let mut outbox = Vec::new();
            for from in 1..5 {
                let vector: Vec<Cost> = (0..5)
                    .map(|i| match i {
                        _ if i == from => 0,
                        _ if rng.gen_bool(0.2) => INF,
                        _ => rng.gen_range(1..30),
                    })
                    .collect();
                engine.receive_update(&RouterPacket::new(from, 0, vector), &mut outbox);
            }

            let state = engine.state();
            for dest in 1..5 {
                let expected = (1..5)
                    .filter(|via| costs[*via] != INF)
                    .map(|via| saturating_cost_add(state.belief(via, dest), costs[via]))
                    .min()
                    .unwrap_or(INF);
                assert_eq!(state.belief(0, dest), expected);
                if expected != INF {
                    let via = state.next_hop(dest);
                    assert_ne!(costs[via], INF);
                    assert_eq!(saturating_cost_add(state.belief(via, dest), costs[via]), expected);
                }
            }
        }
    }

    #[test]
    fn test_unchanged_update_sends_nothing() {
        let mut engine = DvEngine::new(A, &[0, 1, 4]);
        let mut outbox = Vec::new();
        engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, 1]), &mut outbox);
        outbox.clear();

        let changed = engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, 1]), &mut outbox);

        assert!(!changed);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_tie_keeps_current_route() {
        // B and C both offer D at total cost 3
        let mut engine = DvEngine::new(A, &[0, 1, 2, INF]);
        let mut outbox = Vec::new();
        engine.receive_update(&RouterPacket::new(C, A, vec![2, INF, 0, 1]), &mut outbox);
        assert_eq!(engine.state().next_hop(3), C);

        engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, INF, 2]), &mut outbox);
        assert_eq!(engine.state().belief(A, 3), 3);
        assert_eq!(engine.state().next_hop(3), C);
    }

    #[test]
    fn test_tie_picks_lowest_index_for_new_route() {
        let mut engine = DvEngine::new(A, &[0, 1, 2, INF]);
        let mut outbox = Vec::new();
        engine.receive_update(&RouterPacket::new(C, A, vec![INF, INF, 0, INF]), &mut outbox);
        engine.receive_update(&RouterPacket::new(B, A, vec![INF, 0, INF, INF]), &mut outbox);
        assert_eq!(engine.state().belief(A, 3), INF);

        // both reports make D reachable at 3 in the same pass
        engine.state.replace_belief_row(B, &[INF, 0, INF, 2]);
        engine.state.replace_belief_row(C, &[INF, INF, 0, 1]);
        assert!(engine.recompute());
        assert_eq!(engine.state().next_hop(3), B);
    }

    #[test]
    fn test_route_moves_when_next_hop_gets_worse_at_equal_cost() {
        let mut engine = DvEngine::new(A, &[0, 1, 1, INF]);
        let mut outbox = Vec::new();
        engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, INF, 2]), &mut outbox);
        engine.receive_update(&RouterPacket::new(C, A, vec![1, INF, 0, 5]), &mut outbox);
        assert_eq!(engine.state().next_hop(3), B);

        // B worsens, C improves: same cost 3, different next hop
        engine.receive_update(&RouterPacket::new(C, A, vec![1, INF, 0, 2]), &mut outbox);
        outbox.clear();
        let changed = engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, INF, 9]), &mut outbox);

        assert!(changed);
        assert_eq!(engine.state().belief(A, 3), 3);
        assert_eq!(engine.state().next_hop(3), C);
        let to_c = outbox.iter().find(|p| p.dest == C).unwrap();
        assert_eq!(to_c.vector[3], INF);
    }

    #[test]
    fn test_link_down_settles_to_infinity() {
        // A - B - C, no alternate path to C
        let topology = Topology::from_links(3, &[(A, B, 1), (B, C, 1)]).unwrap();
        let mut net = TestNetwork::new(topology);
        net.initialize();
        net.run();

        assert_eq!(net.vector(A), vec![0, 1, 2]);
        assert_eq!(net.engines[A].state().next_hop(C), B);
        assert_eq!(net.engines[B].outgoing_vector(A), vec![INF, 0, 1]);
        assert_eq!(net.engines[A].outgoing_vector(B), vec![0, INF, INF]);

        net.change_link(B, C, INF);

        // B no longer routes to C at all; the entry stays INFINITY for A
        assert_eq!(net.engines[B].outgoing_vector(A), vec![INF, 0, INF]);

        let before = net.delivered;
        net.run();
        // a handful of messages, no counting to infinity
        assert!(net.delivered - before < 10);

        assert_eq!(net.vector(A), vec![0, 1, INF]);
        assert_eq!(net.vector(B), vec![1, 0, INF]);
        assert_eq!(net.vector(C)[A], INF);
        assert_eq!(net.vector(C)[B], INF);
        net.assert_converged();
    }

    #[test]
    fn test_link_cost_increase_reroutes() {
        let mut net = TestNetwork::new(triangle());
        net.initialize();
        net.run();

        net.change_link(A, B, 10);
        net.run();

        net.assert_converged();
        let a = net.engines[A].snapshot();
        assert_eq!(a.cost_to(B), 5);
        assert_eq!(a.next_hop(B), Some(C));
        assert_eq!(a.cost_to(C), 4);
    }

    #[test]
    fn test_link_restore_reconverges() {
        let mut net = TestNetwork::new(five_nodes());
        net.initialize();
        net.run();
        net.change_link(1, 2, INF);
        net.run();
        net.assert_converged();

        net.change_link(1, 2, 1);
        net.run();
        net.assert_converged();
    }

    #[test]
    fn test_convergence_under_random_interleavings() {
        for seed in 0..20 {
            let mut net = TestNetwork::new(five_nodes());
            net.initialize();
            net.run_shuffled(seed);
            net.assert_converged();
        }
    }

    #[test]
    fn test_packets_to_non_neighbors_never_arrive() {
        // 0 and 2 are not linked; every packet between them is dropped
        let topology = Topology::from_links(3, &[(0, 1, 2), (1, 2, 3)]).unwrap();
        let mut net = TestNetwork::new(topology);
        net.initialize();
        net.run();

        assert_eq!(net.engines[0].state().belief_row(2), &[INF; 3]);
        assert_eq!(net.engines[2].state().belief_row(0), &[INF; 3]);
        assert_eq!(net.vector(0), vec![0, 2, 5]);
    }

    #[test]
    fn test_events_reach_sink() {
        let sink = TestSink::default();
        let events = sink.events.clone();
        let mut engine = DvEngine::new_with(
            A,
            &[0, 1, 4],
            EngineConfig::default(),
            Box::new(FixedClock(3)),
            Box::new(sink),
        );
        let mut outbox = Vec::new();
        engine.initialize(&mut outbox);
        engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, 1]), &mut outbox);
        engine.change_link_cost(C, INF, &mut outbox);

        let events = events.borrow();
        let tables = events
            .iter()
            .filter(|e| matches!(e, Event::DistanceTable { .. }))
            .count();
        assert_eq!(tables, 3);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::RouteChanged { dest: C, cost: 2, via: B }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::LinkCostChanged { neighbor: C, from: 4, to: INF }
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::UpdatesSent { count: 2 })));
        if let Some(Event::DistanceTable { snapshot }) = events.last() {
            assert_eq!(snapshot.time, 3);
        } else {
            panic!("last event should be a table dump");
        }
    }

    #[test]
    fn test_no_table_dumps_for_sinks_without_tables() {
        let sink = TestSink {
            skip_tables: true,
            ..Default::default()
        };
        let events = sink.events.clone();
        let mut engine = DvEngine::new_with(
            A,
            &[0, 1, 4],
            EngineConfig::default(),
            Box::new(FixedClock(3)),
            Box::new(sink),
        );
        let mut outbox = Vec::new();
        engine.initialize(&mut outbox);
        engine.receive_update(&RouterPacket::new(B, A, vec![1, 0, 1]), &mut outbox);

        let events = events.borrow();
        assert!(!events.is_empty());
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::DistanceTable { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::RouteChanged { dest: C, cost: 2, via: B }
        )));
    }

    #[test]
    #[should_panic(expected = "delivered to node")]
    fn test_misaddressed_packet_panics() {
        let mut engine = DvEngine::new(A, &[0, 1, 4]);
        let mut outbox = Vec::new();
        engine.receive_update(&RouterPacket::new(B, C, vec![1, 0, 1]), &mut outbox);
    }
}
