//! Command-line parsing for the distribution conformance tester.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimation and testing code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_SIGNIFICANCE, FamilyId};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gof", version, about = "Distribution conformance tester")]
pub struct Cli {
    /// Enable debug logging (overridden by GOF_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Test a sample file against one or more distribution families.
    Test(TestArgs),
    /// Write a seeded synthetic sample drawn from a family.
    Simulate(SimulateArgs),
    /// Answer `<command> <json payload>` lines from stdin with JSON lines on stdout.
    Serve(ServeArgs),
}

/// Options shared by commands that run the tester.
#[derive(Debug, Args, Clone)]
pub struct TesterArgs {
    /// Significance level; p-values above it are reported as a fit.
    #[arg(long, env = "GOF_SIGNIFICANCE", default_value_t = DEFAULT_SIGNIFICANCE)]
    pub significance: f64,

    /// Evaluate families one after another instead of in parallel.
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TestArgs {
    /// Sample file (.json array / {"data": [...]}, or single-column .csv).
    #[arg(value_name = "SAMPLE")]
    pub sample: PathBuf,

    /// Families to test, `|`- or comma-separated (default: all).
    #[arg(short = 't', long, value_name = "LIST")]
    pub types: Option<String>,

    /// Print the results as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Export results to .json (report) or .csv (rows).
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub tester: TesterArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Family to draw from.
    #[arg(short = 'd', long, value_enum)]
    pub family: FamilyId,

    /// Number of values to draw.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output file (.json or .csv).
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub tester: TesterArgs,
}

/// Split a family list on `|` or `,`, dropping empty items.
pub fn parse_family_list(list: &str) -> Vec<String> {
    list.split(['|', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn family_list_accepts_both_separators() {
        assert_eq!(
            parse_family_list("normal| t ,poisson||"),
            vec!["normal", "t", "poisson"]
        );
    }

    #[test]
    fn test_subcommand_parses() {
        let cli = Cli::parse_from(["gof", "test", "data.csv", "-t", "normal|t", "--sequential"]);
        let Command::Test(args) = cli.command else {
            panic!("expected test subcommand");
        };
        assert_eq!(args.types.as_deref(), Some("normal|t"));
        assert!(args.tester.sequential);
        assert!(!cli.verbose);
    }

    #[test]
    fn simulate_uses_family_tokens() {
        let cli = Cli::parse_from(["gof", "simulate", "-d", "lognorm", "-o", "x.json"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate subcommand");
        };
        assert_eq!(args.family, FamilyId::LogNormal);
        assert_eq!(args.count, 200);
    }
}
