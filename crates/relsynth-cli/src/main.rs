//! relsynth CLI - multi-table feature synthesis from the command line.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Fit {
            manifest,
            output,
            tuning,
        } => commands::fit::run(manifest, output, tuning, cli.verbose),

        Commands::Produce {
            manifest,
            params,
            output,
            return_result,
        } => commands::produce::run(manifest, params, output, return_result, cli.verbose),

        Commands::FitProduce {
            train,
            test,
            output,
            params_out,
            tuning,
        } => commands::fit_produce::run(train, test, output, params_out, tuning, cli.verbose),

        Commands::Graph { manifest, json } => commands::graph::run(manifest, json, cli.verbose),

        Commands::Describe { json } => commands::describe::run(json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default = if verbose { "relsynth=debug" } else { "relsynth=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| format!("Failed to initialize tracing: {}", e))?;
    Ok(())
}
