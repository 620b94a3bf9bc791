// Scenario Runner - Load and execute routing scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/triangle.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/triangle.yaml --seed 0x1234...
//   cargo run --bin scenario_runner scenarios/triangle.yaml --csv triangle.csv

mod routing;

use log::info;
use routing::{RoutingRunner, ScenarioError, ScenarioFile};
use simple_logger::SimpleLogger;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX] [--csv PATH]",
            args[0]
        );
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/triangle.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/triangle.yaml --seed 0x123456...", args[0]);
        eprintln!("  {} scenarios/triangle.yaml --csv triangle.csv", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    // Parse optional flags
    let mut seed: Option<[u8; 32]> = None;
    let mut csv: Option<String> = None;
    let mut flags = args[2..].iter();
    while let Some(flag) = flags.next() {
        match (flag.as_str(), flags.next()) {
            ("--seed", Some(value)) => seed = Some(parse_seed_hex(value)),
            ("--csv", Some(value)) => csv = Some(value.clone()),
            _ => {
                eprintln!("Unknown or incomplete option: {}", flag);
                std::process::exit(1);
            }
        }
    }

    let scenarios = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        find_scenarios(path)
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    };

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", path.display());
        std::process::exit(1);
    }

    let mut failures = 0;
    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        let csv_path = csv.as_ref().map(|p| csv_path_for(p, scenario_path, scenarios.len()));
        if let Err(e) = run_scenario_file(scenario_path, seed, csv_path) {
            eprintln!("✗ {}: {}", scenario_path.display(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        eprintln!("\n{} of {} scenario(s) failed", failures, scenarios.len());
        std::process::exit(1);
    }

    println!("\n✓ All scenarios complete!\n");
}

fn find_scenarios(dir: &Path) -> Vec<PathBuf> {
    let mut scenarios = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();
    scenarios
}

/// With several scenarios, `--csv` names a directory and each scenario gets
/// `<stem>.csv` inside it
fn csv_path_for(csv: &str, scenario: &Path, count: usize) -> String {
    if count == 1 {
        return csv.to_string();
    }
    let stem = scenario
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scenario".to_string());
    Path::new(csv)
        .join(format!("{}.csv", stem))
        .to_string_lossy()
        .into_owned()
}

fn run_scenario_file(
    path: &Path,
    seed: Option<[u8; 32]>,
    csv_path: Option<String>,
) -> Result<(), ScenarioError> {
    info!("Loading scenario from: {}", path.display());

    let scenario = ScenarioFile::load(path)?;

    // Print scenario header
    println!("╔════════════════════════════════════════════════════════╗");
    match scenario.meta.name {
        Some(ref name) => println!("║  {}", name),
        None => println!("║  Scenario: {}", path.display()),
    }
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    let mut config = scenario.to_config(seed)?;
    if csv_path.is_some() {
        config.output.csv_path = csv_path;
    }

    println!("Configuration:");
    println!("  Nodes: {}", config.topology.len());
    println!("  Poison reverse: {}", config.engine.poison_reverse);
    println!("  Link changes: {}", config.link_changes.changes.len());
    println!(
        "  Delay: {}..={}",
        config.network.min_delay, config.network.max_delay
    );
    if let Some(ref csv) = config.output.csv_path {
        println!("  CSV output: {}", csv);
    }
    println!("\nStarting simulation...\n");

    let result = RoutingRunner::new(config)?.run();
    result.print_summary();

    scenario.check(&result)?;

    println!("\n✓ Scenario complete!\n");
    Ok(())
}

fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte = std::str::from_utf8(chunk)
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or_else(|| {
                eprintln!("Invalid hex seed: {}", hex);
                std::process::exit(1);
            });
        seed[i] = byte;
    }

    seed
}
