#![deny(missing_docs)]

//! # Apidoc CLI
//!
//! Command Line Interface for the annotation-to-OpenAPI generator.
//!
//! Supported Commands:
//! - `generate`: Extract annotations and write `openapi.yaml`.
//! - `check`: Resolve annotations and print the route table without writing.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod check;
mod generate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Generate OpenAPI documents from source annotations")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build and write the OpenAPI document.
    Generate(generate::GenerateArgs),
    /// Print the resolved route table without writing anything.
    Check(check::CheckArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Generate(args) => args.source.verbose,
            Commands::Check(args) => args.source.verbose,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.command.verbose());

    // Pipeline failures are logged by the orchestrator.
    let result = match &cli.command {
        Commands::Generate(args) => generate::execute(args).map(|_| ()),
        Commands::Check(args) => check::execute(args, &mut std::io::stdout().lock()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "apidoc", "generate", "-d", "src", "-m", "main.go", "-e", "handlers", "-o", "out",
            "--ext", "go", "--ext", "ts", "-v",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.source.dir, std::path::PathBuf::from("src"));
                assert_eq!(args.source.extensions, vec!["go", "ts"]);
                assert_eq!(args.output, std::path::PathBuf::from("out"));
                assert!(args.source.verbose);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
