//! flow-rebalancer CLI
//!
//! Build pooled flow graphs from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Rebalance rows from a JSON file
//! flow-rebalancer rebalance --input rows.json
//!
//! # Output the graph as JSON for a Sankey renderer
//! flow-rebalancer rebalance --input rows.json --format json
//!
//! # Run on the built-in market sample
//! flow-rebalancer sample
//!
//! # Generate a random row set for testing
//! flow-rebalancer generate --rows 30 --seed 7
//! ```

use chrono::{DateTime, Utc};
use flow_rebalancer::core::row::FlowRowSet;
use flow_rebalancer::graph::flow_graph::FlowGraph;
use flow_rebalancer::graph::node_flows::{node_flows, NodeFlow};
use flow_rebalancer::rebalance::allocation::AllocationBreakdown;
use flow_rebalancer::rebalance::rebalancer::{FlowRebalancer, RebalanceSummary};
use flow_rebalancer::simulation::generator::{generate_random_rows, GeneratorConfig};
use flow_rebalancer::simulation::market_sample::market_flows_sample;
use log::info;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"flow-rebalancer — pool outflows and redistribute them across inflows

USAGE:
    flow-rebalancer <COMMAND> [OPTIONS]

COMMANDS:
    rebalance   Build the flow graph for a row file
    sample      Build the flow graph for the built-in market sample
    generate    Generate a random row set (for testing)
    help        Show this message

OPTIONS (rebalance, sample):
    --input <FILE>      Path to JSON rows file (rebalance only)
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --rows <N>          Number of rows (default: 24)
    --seed <N>          Seed for reproducible output
    --output <FILE>     Write to file instead of stdout

ENVIRONMENT:
    RUST_LOG            Log level (default: warn)

EXAMPLES:
    flow-rebalancer rebalance --input rows.json
    flow-rebalancer rebalance --input rows.json --format json
    flow-rebalancer sample --format json
    flow-rebalancer generate --rows 40 --seed 7 --output rows.json"#
    );
}

/// JSON output schema for a rebalancing run.
#[derive(serde::Serialize)]
struct FlowReport {
    generated_at: DateTime<Utc>,
    summary: RebalanceSummary,
    graph: FlowGraph,
    node_flows: Vec<NodeFlow>,
    allocation: AllocationBreakdown,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn load_rows(path: &str) -> FlowRowSet {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));

    let set: FlowRowSet = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "rows": [
    {{ "category": "Equity", "subcategory": "Global Equity", "amount": 10.68 }},
    ["Fixed Income", "Municipal Bond", -43.90]
  ]
}}"#
        );
        process::exit(1);
    });

    info!("loaded {} rows from {}", set.len(), path);
    set
}

/// Parse `--format` and reject anything but text or json.
fn parse_format(value: Option<&String>) -> String {
    match value.map(String::as_str) {
        Some(f @ ("text" | "json")) => f.to_string(),
        _ => fail("--format requires 'text' or 'json'"),
    }
}

fn run_and_print(set: &FlowRowSet, format: &str) {
    let summary = FlowRebalancer::summarize(set.rows()).unwrap_or_else(|e| fail(e));
    let graph = FlowRebalancer::rebalance(set).unwrap_or_else(|e| fail(e));
    if let Err(e) = graph.validate() {
        fail(e);
    }
    let allocation = AllocationBreakdown::from_graph(&graph);

    if format == "json" {
        let report = FlowReport {
            generated_at: Utc::now(),
            summary,
            node_flows: node_flows(&graph),
            graph,
            allocation,
        };
        let json = serde_json::to_string_pretty(&report).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        println!("{}", summary);
        println!("{}", graph);
        println!("{}", allocation);
    }
}

fn cmd_rebalance(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--input requires a file path")),
                );
            }
            "--format" => {
                i += 1;
                format = parse_format(args.get(i));
            }
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let set = load_rows(&path);
    run_and_print(&set, &format);
}

fn cmd_sample(args: &[String]) {
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--format" => {
                i += 1;
                format = parse_format(args.get(i));
            }
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    run_and_print(&market_flows_sample(), &format);
}

fn cmd_generate(args: &[String]) {
    let mut config = GeneratorConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--rows" => {
                i += 1;
                config.row_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--rows requires a number"));
            }
            "--seed" => {
                i += 1;
                config.seed = Some(
                    args.get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(|| fail("--seed requires a number")),
                );
            }
            "--output" => {
                i += 1;
                output_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--output requires a file path")),
                );
            }
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    let set = generate_random_rows(&config);
    let json = serde_json::to_string_pretty(&set).unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("writing to '{}': {}", path, e)));
        eprintln!("Generated {} rows → {}", set.len(), path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "rebalance" => cmd_rebalance(rest),
        "sample" => cmd_sample(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
