//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs the tester / synthetic generator / command loop
//! - prints reports and writes optional exports

use std::io::{BufRead, Write};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ServeArgs, SimulateArgs, TestArgs, TesterArgs};
use crate::domain::TesterConfig;
use crate::error::AppError;
use crate::router::CommandRouter;
use crate::tester::Tester;

pub mod pipeline;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "GOF_LOG";

/// Entry point for the `gof` binary.
pub fn run() -> Result<(), AppError> {
    // Missing .env is fine; variables may come from the environment.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Test(args) => handle_test(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Serve(args) => handle_serve(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "dist_conformance=debug"
    } else {
        "dist_conformance=info"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries results; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn tester_config_from_args(args: &TesterArgs) -> Result<TesterConfig, AppError> {
    let config = TesterConfig {
        significance: args.significance,
        parallel: !args.sequential,
    };
    config.validate()?;
    Ok(config)
}

fn handle_test(args: TestArgs) -> Result<(), AppError> {
    let config = tester_config_from_args(&args.tester)?;
    let families = pipeline::requested_families(args.types.as_deref());
    let run = pipeline::run_test(&args.sample, &families, &config)?;

    if args.json {
        let entries = run.entries();
        let text = serde_json::to_string_pretty(&entries)
            .map_err(|e| AppError::new(4, format!("Failed to serialize results: {e}")))?;
        println!("{text}");
    } else {
        println!(
            "{}",
            crate::report::format_run_summary(&args.sample.display().to_string(), &run.sample, &config)
        );
        print!("{}", crate::report::format_results(&run.evaluations));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_results(path, &run.evaluations, config.significance, run.sample.len())?;
        info!(path = %path.display(), "results exported");
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let sample = crate::data::generate_sample(args.family, args.count, args.seed)?;
    crate::io::save_sample(&sample, &args.output)?;
    info!(
        family = %args.family,
        n = sample.len(),
        seed = args.seed,
        params = %crate::data::canonical_parameters(args.family, args.count),
        path = %args.output.display(),
        "synthetic sample written"
    );
    Ok(())
}

/// Line protocol: `<command> <payload>` per line, one JSON response per line.
fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let config = tester_config_from_args(&args.tester)?;
    let router = CommandRouter::new(Tester::new(config)?);
    info!(commands = ?router.commands(), "serving commands on stdin");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read stdin: {e}")))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, payload) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let response = router.handle(command, payload.trim());
        if response.get("error").is_some() {
            warn!(command, "command answered with an error");
        }
        writeln!(stdout, "{response}")
            .and_then(|()| stdout.flush())
            .map_err(|e| AppError::new(2, format!("Failed to write response: {e}")))?;
    }
    Ok(())
}
