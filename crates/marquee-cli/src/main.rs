//! marquee - command-line client for the movie catalog API.
//!
//! A thin wrapper over the marquee libraries: it keeps the session in the
//! platform data directory and drives the authenticated client from the
//! terminal.

mod cli;
mod commands;
mod output;
mod session;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, movies, trailer, upload};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let outcome = match cli.command {
        Commands::Auth(cmd) => auth::handle(cmd, &cli.connection).await,
        Commands::Movies(cmd) => movies::handle(cmd, &cli.connection).await,
        Commands::Upload(args) => upload::run(args, &cli.connection).await,
        Commands::Trailer(args) => trailer::run(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
