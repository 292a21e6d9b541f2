//! BMS simulator entry point — CLI wiring and config-driven episode runs.

use std::path::Path;
use std::process;

use chrono::TimeDelta;

use bms_sim::config::EnvConfig;
use bms_sim::env::{BmsEnv, Observation};
use bms_sim::io::export::export_csv;
use bms_sim::io::load_aligned_csv;
use bms_sim::report::EpisodeReport;
use bms_sim::signals::{SeriesSignals, Signals, SyntheticSignals};

/// Construction-time seed for the synthetic signal source; `--seed`
/// reseeds at reset.
const DEFAULT_SIGNAL_SEED: u64 = 42;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed: Option<u64>,
    pv_csv: Option<String>,
    load_csv: Option<String>,
    tolerance_minutes: i64,
    telemetry_out: Option<String>,
}

fn print_help() {
    eprintln!("bms-sim — hour-by-hour battery energy storage simulator");
    eprintln!();
    eprintln!("Usage: bms-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load configuration from a TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline)");
    eprintln!("  --seed <u64>             Reseed the stochastic signal source");
    eprintln!("  --pv-csv <path>          PV generation series (timestamp,kW)");
    eprintln!("  --load-csv <path>        Load series (timestamp,kW)");
    eprintln!("  --tolerance-minutes <n>  Series alignment tolerance (default: 1)");
    eprintln!("  --telemetry-out <path>   Export the episode step log to CSV");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed: None,
        pv_csv: None,
        load_csv: None,
        tolerance_minutes: 1,
        telemetry_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--pv-csv" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --pv-csv requires a path argument");
                    process::exit(1);
                }
                cli.pv_csv = Some(args[i].clone());
            }
            "--load-csv" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --load-csv requires a path argument");
                    process::exit(1);
                }
                cli.load_csv = Some(args[i].clone());
            }
            "--tolerance-minutes" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --tolerance-minutes requires an integer argument");
                    process::exit(1);
                }
                if let Ok(n) = args[i].parse::<i64>() {
                    cli.tolerance_minutes = n;
                } else {
                    eprintln!(
                        "error: --tolerance-minutes value \"{}\" is not a valid integer",
                        args[i]
                    );
                    process::exit(1);
                }
            }
            "--telemetry-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --telemetry-out requires a path argument");
                    process::exit(1);
                }
                cli.telemetry_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Myopic demo policy: request the action that offsets the observed net
/// load, clamped to the rated envelope. Charges on surplus, discharges
/// on deficit. The engine itself is policy-free; this lives here.
fn myopic_action(obs: &Observation, config: &EnvConfig) -> f64 {
    (obs.generation_kw - obs.load_kw).clamp(config.action.min_kw, config.action.max_kw)
}

/// Builds the signal source selected by config and CLI.
fn build_signals(config: &EnvConfig, cli: &CliArgs) -> Signals {
    if config.exogenous.source == "series" {
        let (Some(pv), Some(load)) = (&cli.pv_csv, &cli.load_csv) else {
            eprintln!("error: series source requires both --pv-csv and --load-csv");
            process::exit(1);
        };
        let tolerance = TimeDelta::minutes(cli.tolerance_minutes.max(0));
        match load_aligned_csv(Path::new(pv), Path::new(load), tolerance) {
            Ok(points) => {
                eprintln!("Loaded {} aligned series rows", points.len());
                Signals::Series(SeriesSignals::new(points))
            }
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    } else {
        Signals::Synthetic(SyntheticSignals::from_config(
            &config.exogenous,
            DEFAULT_SIGNAL_SEED,
        ))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline
    let mut config = if let Some(ref path) = cli.scenario_path {
        match EnvConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match EnvConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        EnvConfig::baseline()
    };

    // CSV paths on the command line switch the source to series mode.
    if cli.pv_csv.is_some() || cli.load_csv.is_some() {
        config.exogenous.source = "series".to_string();
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let signals = build_signals(&config, &cli);
    let dt_hours = config.episode.time_interval_hours;
    let mut env = match BmsEnv::new(config, signals) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Run one episode under the myopic policy
    let (mut obs, _info) = env.reset(cli.seed);
    let mut steps = Vec::new();
    loop {
        let action = myopic_action(&obs, env.config());
        let result = match env.step(action) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        println!("{result}");
        obs = result.observation;
        let done = result.terminated;
        steps.push(result);
        if done {
            break;
        }
    }

    let report = EpisodeReport::from_steps(&steps, dt_hours);
    println!("\n{report}");

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&steps, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }
}
