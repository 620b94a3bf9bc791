//! Statistics and results for the routing simulator

use dv_rust::{Cost, NodeId, SimTime, Snapshot, INFINITY};

/// Simulation result
#[derive(Debug)]
pub struct SimResult {
    /// Seed used for the simulation
    pub seed_used: [u8; 32],

    /// Number of events processed (deliveries and link changes)
    pub events_processed: usize,

    /// Simulated time of the last processed event
    pub final_time: SimTime,

    /// True when the run stopped because no events were left
    pub quiescent: bool,

    pub message_stats: MessageStats,

    pub convergence: ConvergenceReport,

    /// Final tables of every node, by node id
    pub tables: Vec<Snapshot>,
}

impl SimResult {
    /// Digest over all final distance vectors and routes. Identical seeds and
    /// configs must give identical fingerprints.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        for table in &self.tables {
            hasher.update(&(table.my_id as u64).to_le_bytes());
            for cost in table.distance_vector() {
                hasher.update(&cost.to_le_bytes());
            }
            for via in &table.routes {
                hasher.update(&(*via as u64).to_le_bytes());
            }
        }
        hasher.update(&self.final_time.to_le_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Print a summary of the simulation results
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Routing Simulation Results                      ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  Seed: {:?}", self.seed_used);
        println!("  Events processed: {}", self.events_processed);
        println!(
            "  Final time: {} ({})\n",
            self.final_time,
            if self.quiescent { "quiescent" } else { "stopped at max_time" }
        );

        println!("Message Statistics:");
        println!("  Sent: {}", self.message_stats.sent);
        println!("  Delivered: {}", self.message_stats.delivered);
        println!(
            "  Filtered (self / non-neighbour): {}",
            self.message_stats.filtered
        );
        println!("  Link changes: {}", self.message_stats.link_changes);
        println!();

        println!("Convergence:");
        if self.convergence.converged {
            println!("  ✓ All distance vectors match the shortest paths");
        } else {
            println!(
                "  ✗ {} entries differ from the shortest paths",
                self.convergence.mismatches.len()
            );
            for m in &self.convergence.mismatches {
                println!(
                    "    node {} -> {}: expected {}, got {}",
                    m.node,
                    m.dest,
                    fmt_cost(m.expected),
                    fmt_cost(m.actual)
                );
            }
        }
        match self.convergence.last_route_change {
            Some(time) => println!("  Last route change: T={}", time),
            None => println!("  No route changes"),
        }
        println!();

        println!("Final Routes:");
        for table in &self.tables {
            let routes: Vec<String> = (0..table.routes.len())
                .map(|dest| match table.next_hop(dest) {
                    Some(via) => format!("{}:{}/{}", dest, fmt_cost(table.cost_to(dest)), via),
                    None if dest == table.my_id => format!("{}:self", dest),
                    None => format!("{}:-", dest),
                })
                .collect();
            println!("  node {:>3}  {}", table.my_id, routes.join("  "));
        }

        let fingerprint: String = self.fingerprint()[..8]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        println!("\n  Fingerprint: {}", fingerprint);
    }
}

fn fmt_cost(cost: Cost) -> String {
    if cost >= INFINITY {
        "inf".to_string()
    } else {
        cost.to_string()
    }
}

/// Message statistics
#[derive(Debug, Default, Clone)]
pub struct MessageStats {
    /// Packets handed to the transport by engines
    pub sent: usize,

    /// Packets delivered to a receiving engine
    pub delivered: usize,

    /// Packets dropped at the boundary (self or non-neighbour)
    pub filtered: usize,

    /// Link-change events fired
    pub link_changes: usize,
}

/// Comparison of the final tables against the reference shortest paths
#[derive(Debug, Default, Clone)]
pub struct ConvergenceReport {
    pub converged: bool,

    pub mismatches: Vec<Mismatch>,

    /// Time of the last change to any node's routes
    pub last_route_change: Option<SimTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub node: NodeId,
    pub dest: NodeId,
    pub expected: Cost,
    pub actual: Cost,
}

impl ConvergenceReport {
    /// Compare every node's own vector against `reference[node]`
    pub fn compare(
        tables: &[Snapshot],
        reference: &[Vec<Cost>],
        last_route_change: Option<SimTime>,
    ) -> Self {
        let mut mismatches = Vec::new();
        for table in tables {
            for (dest, expected) in reference[table.my_id].iter().enumerate() {
                if dest == table.my_id {
                    continue;
                }
                let actual = table.cost_to(dest);
                if actual != *expected {
                    mismatches.push(Mismatch {
                        node: table.my_id,
                        dest,
                        expected: *expected,
                        actual,
                    });
                }
            }
        }

        Self {
            converged: mismatches.is_empty(),
            mismatches,
            last_route_change,
        }
    }
}
