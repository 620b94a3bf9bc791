//! Event sinks for the routing simulator

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use dv_rust::{Event, EventSink, NodeId, SimTime, INFINITY};

// ============================================================================
// Console Logging Sink
// ============================================================================

/// Logging event sink that outputs events to console
pub struct ConsoleEventSink {
    enabled: bool,
}

impl ConsoleEventSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl EventSink for ConsoleEventSink {
    fn log(&mut self, time: SimTime, node: NodeId, event: Event) {
        if !self.enabled {
            return;
        }

        match event {
            Event::UpdateReceived { from } => {
                println!("{:>6} {:>4} UpdateReceived   from:{}", time, node, from);
            }
            Event::LinkCostChanged { neighbor, from, to } => {
                println!(
                    "{:>6} {:>4} LinkCostChanged  nbr:{} {} -> {}",
                    time,
                    node,
                    neighbor,
                    fmt_cost(from),
                    fmt_cost(to)
                );
            }
            Event::RouteChanged { dest, cost, via } => {
                println!(
                    "{:>6} {:>4} RouteChanged     dst:{} cost:{} via:{}",
                    time,
                    node,
                    dest,
                    fmt_cost(cost),
                    via
                );
            }
            Event::UpdatesSent { count } => {
                println!("{:>6} {:>4} UpdatesSent      count:{}", time, node, count);
            }
            Event::DistanceTable { snapshot } => {
                println!("{}", snapshot);
            }
        }
    }

    fn wants_tables(&self) -> bool {
        self.enabled
    }
}

fn fmt_cost(cost: u32) -> String {
    if cost >= INFINITY {
        "inf".to_string()
    } else {
        cost.to_string()
    }
}

// ============================================================================
// CSV Event Sink
// ============================================================================

/// CSV event sink for structured data export
pub struct CsvEventSink {
    writer: BufWriter<File>,
}

impl CsvEventSink {
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Write CSV header
        writeln!(writer, "time,node,event_type,peer,value1,value2")?;

        Ok(Self { writer })
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl EventSink for CsvEventSink {
    fn log(&mut self, time: SimTime, node: NodeId, event: Event) {
        let result = match event {
            Event::UpdateReceived { from } => {
                writeln!(self.writer, "{},{},UpdateReceived,{},0,0", time, node, from)
            }
            Event::LinkCostChanged { neighbor, from, to } => writeln!(
                self.writer,
                "{},{},LinkCostChanged,{},{},{}",
                time, node, neighbor, from, to
            ),
            Event::RouteChanged { dest, cost, via } => writeln!(
                self.writer,
                "{},{},RouteChanged,{},{},{}",
                time, node, dest, cost, via
            ),
            Event::UpdatesSent { count } => {
                writeln!(self.writer, "{},{},UpdatesSent,0,{},0", time, node, count)
            }
            // tables are too wide for a row; the route changes carry the same data
            Event::DistanceTable { .. } => Ok(()),
        };

        if let Err(e) = result {
            eprintln!("Error writing to CSV: {}", e);
        }
    }

    fn wants_tables(&self) -> bool {
        false
    }
}

impl Drop for CsvEventSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

// ============================================================================
// Collector Event Sink (In-Memory)
// ============================================================================

/// Collects events in memory for programmatic analysis
#[derive(Default)]
pub struct CollectorEventSink {
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone)]
pub struct EventRecord {
    pub time: SimTime,
    pub node: NodeId,
    pub event: Event,
}

impl CollectorEventSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn route_changes(&self) -> impl Iterator<Item = &EventRecord> {
        self.events
            .iter()
            .filter(|e| matches!(e.event, Event::RouteChanged { .. }))
    }

    pub fn table_dumps(&self) -> impl Iterator<Item = &EventRecord> {
        self.events
            .iter()
            .filter(|e| matches!(e.event, Event::DistanceTable { .. }))
    }

    /// Time of the last route change, if any happened
    pub fn last_route_change(&self) -> Option<SimTime> {
        self.route_changes().map(|e| e.time).max()
    }
}

impl EventSink for CollectorEventSink {
    fn log(&mut self, time: SimTime, node: NodeId, event: Event) {
        self.events.push(EventRecord { time, node, event });
    }
}

// ============================================================================
// Multi Sink (Combine Multiple Sinks)
// ============================================================================

/// Combines multiple event sinks
#[derive(Default)]
pub struct MultiEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl MultiEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for MultiEventSink {
    fn log(&mut self, time: SimTime, node: NodeId, event: Event) {
        for sink in &mut self.sinks {
            if matches!(event, Event::DistanceTable { .. }) && !sink.wants_tables() {
                continue;
            }
            sink.log(time, node, event.clone());
        }
    }

    fn wants_tables(&self) -> bool {
        self.sinks.iter().any(|sink| sink.wants_tables())
    }
}

// ============================================================================
// Shared Sink (one sink behind many engines)
// ============================================================================

/// Hands one sink to every engine of a simulation; each engine owns a clone
pub struct SharedSink<S: EventSink> {
    inner: Rc<RefCell<S>>,
}

impl<S: EventSink> SharedSink<S> {
    pub fn new(inner: Rc<RefCell<S>>) -> Self {
        Self { inner }
    }
}

impl<S: EventSink> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: EventSink> EventSink for SharedSink<S> {
    fn log(&mut self, time: SimTime, node: NodeId, event: Event) {
        self.inner.borrow_mut().log(time, node, event);
    }

    fn wants_tables(&self) -> bool {
        self.inner.borrow().wants_tables()
    }
}
