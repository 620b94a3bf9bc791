//! Routing Simulation Example
//!
//! The classic three-router network (0-1: 4, 0-2: 1, 1-2: 50). At T=40 the
//! link 0-1 jumps to 60 and at T=200 it drops back to 4. Runs once with and
//! once without poison reverse so the message counts can be compared.
//!
//! Run with: cargo run --bin routing_sim [--tables] [--csv]
//!
//! `--csv` writes routing_sim_poison_reverse.csv and routing_sim_plain.csv.

mod routing;

use dv_rust::EngineConfig;
use log::info;
use routing::{LinkChangeSchedule, OutputConfig, RoutingRunner, RoutingSimConfig};
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new().init().unwrap();

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║        Distance-Vector Routing Simulator               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    let verbose = std::env::args().any(|a| a == "--tables");
    let csv = std::env::args().any(|a| a == "--csv");

    for poison_reverse in [true, false] {
        let csv_path = csv.then(|| {
            let name = if poison_reverse { "poison_reverse" } else { "plain" };
            format!("routing_sim_{}.csv", name)
        });
        let config = RoutingSimConfig {
            engine: EngineConfig { poison_reverse },
            link_changes: LinkChangeSchedule::new().at(40, 0, 1, 60).at(200, 0, 1, 4),
            seed: Some([42; 32]),
            output: OutputConfig {
                enable_console: verbose,
                csv_path: csv_path.clone(),
            },
            ..Default::default()
        };

        info!("Configuration:");
        info!("  Nodes: {}", config.topology.len());
        info!("  Poison reverse: {}", poison_reverse);
        info!("  Link changes: {:?}", config.link_changes.changes);
        if let Some(ref path) = csv_path {
            info!("  CSV output: {}", path);
        }
        info!("");

        let runner = RoutingRunner::new(config).unwrap();
        let result = runner.run();

        // Display results
        result.print_summary();
    }

    info!("✓ Simulation complete!");
}
