//! dedicated-portfolio CLI
//!
//! Build a least-cost dedicated portfolio from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Fund a liability schedule from a Treasury price file
//! dedicated-portfolio solve --settlement 01152024 --bonds prices.csv --cashflows liabilities.csv
//!
//! # Write holdings to CSV, report as JSON
//! dedicated-portfolio solve --settlement 01152024 --bonds prices.csv \
//!     --cashflows liabilities.csv --output holdings.csv --format json
//!
//! # Generate a random universe and schedule for testing
//! dedicated-portfolio generate --instruments 200 --obligations 20 --seed 42 \
//!     --bonds-out prices.csv --cashflows-out liabilities.csv
//! ```

use dedicated_portfolio::config::DedicationConfig;
use dedicated_portfolio::core::date::{parse_date, DateFormat};
use dedicated_portfolio::data::output::{write_holdings_csv, write_report_json};
use dedicated_portfolio::data::treasury::{
    read_liability_file, read_price_file, screen_universe, write_liabilities, write_price_records,
};
use dedicated_portfolio::error::DedicationError;
use dedicated_portfolio::optimization::dedication::DedicationEngine;
use dedicated_portfolio::optimization::report::PortfolioReport;
use dedicated_portfolio::simulation::universe::{generate_scenario, UniverseConfig};
use chrono::NaiveDate;
use std::fs::File;
use std::io;
use std::process;

const DEFAULT_OUTPUT: &str = "Output.csv";

fn print_usage() {
    eprintln!(
        r#"dedicated-portfolio: least-cost cash-flow matching with Treasury securities

USAGE:
    dedicated-portfolio <COMMAND> [OPTIONS]

COMMANDS:
    solve       Find the cheapest portfolio that funds a liability schedule
    generate    Generate a random price file and liability file (for testing)
    help        Show this message

OPTIONS (solve):
    --settlement <MMDDYYYY>  Settlement date
    --bonds <FILE>           Treasury price file (CSV, no header)
    --cashflows <FILE>       Liability file (CSV with dates,cfs header)
    --output <FILE>          Holdings CSV (cusip,face_value,cost), default Output.csv
    --format <FORMAT>        Report format: text (default) or json
    --config <FILE>          JSON configuration overriding the defaults

OPTIONS (generate):
    --instruments <N>        Number of instruments (default: 50)
    --obligations <N>        Number of obligations (default: 10)
    --seed <N>               Seed for a reproducible scenario
    --settlement <MMDDYYYY>  Settlement date (default: 01152024)
    --bonds-out <FILE>       Where to write the price file
    --cashflows-out <FILE>   Where to write the liability file

EXAMPLES:
    dedicated-portfolio solve --settlement 01152024 --bonds prices.csv --cashflows liabilities.csv
    dedicated-portfolio solve --settlement 01152024 --bonds prices.csv --cashflows liabilities.csv --format json
    dedicated-portfolio generate --instruments 200 --obligations 20 --seed 42 --bonds-out prices.csv --cashflows-out liabilities.csv"#
    );
}

fn or_exit<T>(result: Result<T, DedicationError>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    })
}

fn option_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, what);
        process::exit(1);
    })
}

fn required(value: Option<String>, flag: &str, what: &str) -> String {
    value.unwrap_or_else(|| {
        eprintln!("Error: {} <{}> is required", flag, what);
        process::exit(1);
    })
}

fn parse_settlement(raw: &str) -> NaiveDate {
    or_exit(parse_date(raw, DateFormat::Compact).map_err(DedicationError::from))
}

fn create_file(path: &str) -> File {
    File::create(path).unwrap_or_else(|e| {
        eprintln!("Error writing to '{}': {}", path, e);
        process::exit(1);
    })
}

fn cmd_solve(args: &[String]) {
    let mut settlement = None;
    let mut bonds_path = None;
    let mut cashflows_path = None;
    let mut output_path = None;
    let mut config_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--settlement" => {
                i += 1;
                settlement = Some(option_value(args, i, "--settlement", "a MMDDYYYY date"));
            }
            "--bonds" => {
                i += 1;
                bonds_path = Some(option_value(args, i, "--bonds", "a file path"));
            }
            "--cashflows" => {
                i += 1;
                cashflows_path = Some(option_value(args, i, "--cashflows", "a file path"));
            }
            "--output" => {
                i += 1;
                output_path = Some(option_value(args, i, "--output", "a file path"));
            }
            "--config" => {
                i += 1;
                config_path = Some(option_value(args, i, "--config", "a file path"));
            }
            "--format" => {
                i += 1;
                format = option_value(args, i, "--format", "'text' or 'json'");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let settlement = parse_settlement(&required(settlement, "--settlement", "MMDDYYYY"));
    let bonds_path = required(bonds_path, "--bonds", "FILE");
    let cashflows_path = required(cashflows_path, "--cashflows", "FILE");

    let config = match config_path {
        Some(path) => or_exit(DedicationConfig::from_json_file(&path)),
        None => DedicationConfig::default(),
    };

    let records = or_exit(read_price_file(&bonds_path));
    let (universe, _) = or_exit(screen_universe(&records, settlement, config.min_price));
    let liabilities = or_exit(read_liability_file(&cashflows_path));

    let engine = DedicationEngine::new(config);
    let portfolio = or_exit(engine.run(settlement, &universe, &liabilities));
    let report = PortfolioReport::from_portfolio(&portfolio);

    let output_path = output_path.unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    or_exit(write_holdings_csv(create_file(&output_path), &report));
    eprintln!("Wrote {} holdings → {}", report.holdings.len(), output_path);

    if format == "json" {
        or_exit(write_report_json(io::stdout().lock(), &report));
        println!();
    } else {
        println!("{}", report);
        println!("{}", portfolio.ledger());
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = UniverseConfig::default();
    let mut bonds_out = None;
    let mut cashflows_out = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--instruments" => {
                i += 1;
                config.instrument_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--instruments requires a number");
                        process::exit(1);
                    });
            }
            "--obligations" => {
                i += 1;
                config.obligation_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--obligations requires a number");
                        process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                config.seed = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    process::exit(1);
                }));
            }
            "--settlement" => {
                i += 1;
                config.settlement =
                    parse_settlement(&option_value(args, i, "--settlement", "a MMDDYYYY date"));
            }
            "--bonds-out" => {
                i += 1;
                bonds_out = Some(option_value(args, i, "--bonds-out", "a file path"));
            }
            "--cashflows-out" => {
                i += 1;
                cashflows_out = Some(option_value(args, i, "--cashflows-out", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let bonds_out = required(bonds_out, "--bonds-out", "FILE");
    let cashflows_out = required(cashflows_out, "--cashflows-out", "FILE");

    let scenario = or_exit(generate_scenario(&config).map_err(DedicationError::from));
    or_exit(write_price_records(create_file(&bonds_out), &scenario.instruments));
    or_exit(write_liabilities(create_file(&cashflows_out), &scenario.obligations));

    eprintln!(
        "Generated {} instruments → {}, {} obligations → {}",
        scenario.instruments.len(),
        bonds_out,
        scenario.obligations.len(),
        cashflows_out
    );
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "solve" => cmd_solve(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
