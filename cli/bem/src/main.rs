//! BEM CLI: compose blocks, match them against stock and synthesize values.
//!
//! Usage:
//!   bem init <name>                      Scaffold a new project
//!   bem compose <block> [-m k=v] [-s a=v]  Show the composed modules
//!   bem match <block> ...                List suitable stock parts
//!   bem synth <value> --values <list>    Build a series/parallel combination
//!   bem resolve <block> ...              Pick a part and settle its value
//!   bem scope                            List the block library

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::synth::SynthRequest;
use commands::{BlockArgs, Project};

#[derive(Parser)]
#[command(
    name = "bem",
    version,
    about = "Block-element-modifier component resolution"
)]
struct Cli {
    /// Path to bem.toml (default: search upward from the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new BEM project
    Init {
        /// Project name (also the directory name)
        name: String,
    },
    /// Compose a block and show its modules and arguments
    Compose {
        #[command(flatten)]
        block: BlockArgs,
    },
    /// List stock parts suitable for a block, best first
    Match {
        #[command(flatten)]
        block: BlockArgs,
    },
    /// Realize a value as a series/parallel combination
    Synth {
        /// Desired value (e.g. 3.3k, 220nF)
        desired: String,
        /// Available values, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<String>,
        /// Allowed error in percent (default: [synthesis] error_percent)
        #[arg(long)]
        error: Option<f64>,
        /// Values add in parallel (capacitor-like)
        #[arg(long)]
        decrease: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resolve a block to a stock part and a value
    Resolve {
        #[command(flatten)]
        block: BlockArgs,
        /// Accept a resolution without a concrete part
        #[arg(long = "virtual")]
        virtual_part: bool,
    },
    /// List the blocks in the library with their modifier values
    Scope {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `-v` turns on debug output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let project = || -> anyhow::Result<Project> {
        let project = Project::discover(cli.config.as_deref(), &cwd)?;
        tracing::debug!(root = %project.root.display(), "using project");
        Ok(project)
    };

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),
        Commands::Compose { block } => commands::compose::run(&project()?, &block),
        Commands::Match { block } => commands::stock::run(&project()?, &block),
        Commands::Synth {
            desired,
            values,
            error,
            decrease,
            json,
        } => {
            let error_percent = match error {
                Some(error) => error,
                None => project()?.config.synthesis.error_percent,
            };
            commands::synth::run(&SynthRequest {
                desired: &desired,
                values: &values,
                error_percent,
                decrease,
                json,
            })
        }
        Commands::Resolve {
            block,
            virtual_part,
        } => commands::resolve::run(&project()?, &block, virtual_part),
        Commands::Scope { json } => commands::scope::run(&project()?, json),
    }
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
    fn parse_resolve_with_modifiers() {
        let cli = Cli::try_parse_from([
            "bem", "resolve", "basic.Resistor", "-m", "series=E24", "-m", "mount=smd", "-s",
            "value=4.7k", "--virtual", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Resolve {
                block,
                virtual_part,
            } => {
                assert_eq!(block.name, "basic.Resistor");
                assert_eq!(block.mods, vec!["series=E24", "mount=smd"]);
                assert_eq!(block.sets, vec!["value=4.7k"]);
                assert!(block.json);
                assert!(virtual_part);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn parse_synth_value_list() {
        let cli = Cli::try_parse_from([
            "bem", "-v", "synth", "3.3k", "--values", "1k,2.2k,4.7k", "--error", "10",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Synth { desired, values, error, decrease, .. } => {
                assert_eq!(desired, "3.3k");
                assert_eq!(values, vec!["1k", "2.2k", "4.7k"]);
                assert_eq!(error, Some(10.0));
                assert!(!decrease);
            }
            _ => panic!("expected synth"),
        }
    }

    #[test]
    fn synth_requires_values() {
        assert!(Cli::try_parse_from(["bem", "synth", "100"]).is_err());
    }
}
