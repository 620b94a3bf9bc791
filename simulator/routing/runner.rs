//! Discrete-event routing simulation runner

use super::config::{LinkChange, RoutingSimConfig};
use super::event_sinks::{ConsoleEventSink, CsvEventSink, MultiEventSink, SharedSink};
use super::stats::{ConvergenceReport, MessageStats, SimResult};
use dv_rust::{
    Clock, DvEngine, EventSink, NodeId, RouterPacket, SharedClock, SimTime, Topology,
    TopologyError,
};
use hashbrown::HashMap;
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::Rc;

enum SimEventKind {
    Deliver(RouterPacket),
    LinkChange(LinkChange),
}

/// Queue entry; ordered by time, ties broken by scheduling order
struct ScheduledEvent {
    time: SimTime,
    sequence: u64,
    kind: SimEventKind,
}

impl ScheduledEvent {
    fn key(&self) -> (SimTime, u64) {
        (self.time, self.sequence)
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Routing simulation runner.
///
/// Owns the simulated clock, the topology and one engine per node. Packets
/// get a random delay but never overtake earlier packets of the same
/// (source, destination) pair; packets to self or to non-neighbours are
/// dropped when sent.
pub struct RoutingRunner {
    config: RoutingSimConfig,
    rng: StdRng,
    seed: [u8; 32],

    topology: Topology,
    engines: Vec<DvEngine>,
    clock: SharedClock,

    queue: BinaryHeap<Reverse<ScheduledEvent>>,
    sequence: u64,
    last_arrival: HashMap<(NodeId, NodeId), SimTime>,

    // Metrics
    events_processed: usize,
    message_stats: MessageStats,
    last_route_change: Option<SimTime>,
}

impl RoutingRunner {
    /// Create a runner with the sinks named in `config.output`
    pub fn new(config: RoutingSimConfig) -> Result<Self, TopologyError> {
        Self::with_sink(config, None)
    }

    /// Create a runner that additionally reports every engine event to `extra`
    pub fn with_sink(
        config: RoutingSimConfig,
        extra: Option<Box<dyn EventSink>>,
    ) -> Result<Self, TopologyError> {
        let topology = config.topology.clone();
        for change in &config.link_changes.changes {
            topology.check_link(change.a, change.b, change.cost)?;
        }

        let seed = config.resolve_seed();
        let rng = StdRng::from_seed(seed);
        let clock = SharedClock::new();

        let sink = Rc::new(RefCell::new(Self::build_sink(&config, extra)));
        let engines = (0..topology.len())
            .map(|id| {
                DvEngine::new_with(
                    id,
                    topology.link_costs(id),
                    config.engine.clone(),
                    Box::new(clock.clone()),
                    Box::new(SharedSink::new(sink.clone())),
                )
            })
            .collect();

        Ok(Self {
            config,
            rng,
            seed,
            topology,
            engines,
            clock,
            queue: BinaryHeap::new(),
            sequence: 0,
            last_arrival: HashMap::new(),
            events_processed: 0,
            message_stats: MessageStats::default(),
            last_route_change: None,
        })
    }

    fn build_sink(config: &RoutingSimConfig, extra: Option<Box<dyn EventSink>>) -> MultiEventSink {
        let mut sink = MultiEventSink::new();

        if config.output.enable_console {
            sink.add_sink(Box::new(ConsoleEventSink::new(true)));
        }

        if let Some(ref path) = config.output.csv_path {
            match CsvEventSink::new(path) {
                Ok(csv) => sink.add_sink(Box::new(csv)),
                Err(e) => eprintln!("Failed to create CSV output {}: {}", path, e),
            }
        }

        if let Some(extra) = extra {
            sink.add_sink(extra);
        }

        sink
    }

    /// Main simulation loop: runs until no events are left or the next event
    /// lies beyond `max_time`
    pub fn run(mut self) -> SimResult {
        info!(
            "Starting routing simulation: {} nodes, {} link changes, seed {:?}",
            self.topology.len(),
            self.config.link_changes.changes.len(),
            self.seed
        );

        // every node announces its link costs at T=0
        self.clock.set(0);
        for id in 0..self.engines.len() {
            debug!("node {} neighbours {:?}", id, self.topology.neighbors(id));
            let mut outbox = Vec::new();
            self.engines[id].initialize(&mut outbox);
            self.transmit(outbox);
        }

        for change in self.config.link_changes.changes.clone() {
            self.schedule(change.time, SimEventKind::LinkChange(change));
        }

        let mut quiescent = true;
        while let Some(Reverse(event)) = self.queue.pop() {
            if event.time > self.config.max_time {
                warn!(
                    "Stopping at max_time {} with {} events pending",
                    self.config.max_time,
                    self.queue.len() + 1
                );
                quiescent = false;
                break;
            }

            self.clock.set(event.time);
            self.events_processed += 1;

            match event.kind {
                SimEventKind::Deliver(packet) => self.deliver(packet),
                SimEventKind::LinkChange(change) => self.apply_link_change(change),
            }
        }

        info!(
            "Simulation finished at T={} after {} events",
            self.clock.now(),
            self.events_processed
        );

        self.build_result(quiescent)
    }

    fn schedule(&mut self, time: SimTime, kind: SimEventKind) {
        self.sequence += 1;
        self.queue.push(Reverse(ScheduledEvent {
            time,
            sequence: self.sequence,
            kind,
        }));
    }

    /// Hand packets to the simulated network
    fn transmit(&mut self, outbox: Vec<RouterPacket>) {
        let now = self.clock.now();
        let min_delay = self.config.network.min_delay;
        let max_delay = self.config.network.max_delay.max(min_delay);

        for packet in outbox {
            self.message_stats.sent += 1;

            if packet.source == packet.dest
                || !self.topology.is_neighbor(packet.source, packet.dest)
            {
                trace!("drop {} -> {} (not a neighbour)", packet.source, packet.dest);
                self.message_stats.filtered += 1;
                continue;
            }

            // FIFO per directed pair: never arrive before the previous packet
            let key = (packet.source, packet.dest);
            let delay = self.rng.gen_range(min_delay..=max_delay);
            let earliest = self.last_arrival.get(&key).copied().unwrap_or(0);
            let arrival = (now + delay).max(earliest);
            self.last_arrival.insert(key, arrival);

            self.schedule(arrival, SimEventKind::Deliver(packet));
        }
    }

    fn deliver(&mut self, packet: RouterPacket) {
        self.message_stats.delivered += 1;

        let mut outbox = Vec::new();
        if self.engines[packet.dest].receive_update(&packet, &mut outbox) {
            self.last_route_change = Some(self.clock.now());
        }
        self.transmit(outbox);
    }

    /// Links are bidirectional: both endpoints see the new cost
    fn apply_link_change(&mut self, change: LinkChange) {
        let old = match self.topology.set_link(change.a, change.b, change.cost) {
            Ok(old) => old,
            Err(e) => {
                warn!("Ignoring link change {:?}: {}", change, e);
                return;
            }
        };
        self.message_stats.link_changes += 1;

        debug!(
            "T={} link {} <-> {}: {} -> {}",
            self.clock.now(),
            change.a,
            change.b,
            old,
            change.cost
        );

        let mut outbox = Vec::new();
        let changed_a = self.engines[change.a].change_link_cost(change.b, change.cost, &mut outbox);
        let changed_b = self.engines[change.b].change_link_cost(change.a, change.cost, &mut outbox);
        if changed_a || changed_b {
            self.last_route_change = Some(self.clock.now());
        }
        self.transmit(outbox);
    }

    /// Build final result
    fn build_result(&self, quiescent: bool) -> SimResult {
        let tables: Vec<_> = self.engines.iter().map(DvEngine::snapshot).collect();
        let reference = self.topology.shortest_paths();
        let convergence = ConvergenceReport::compare(&tables, &reference, self.last_route_change);

        SimResult {
            seed_used: self.seed,
            events_processed: self.events_processed,
            final_time: self.clock.now(),
            quiescent,
            message_stats: self.message_stats.clone(),
            convergence,
            tables,
        }
    }
}
