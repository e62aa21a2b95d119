//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::auth::AuthCommand;
use crate::commands::movies::MoviesCommand;
use crate::commands::trailer::TrailerArgs;
use crate::commands::upload::UploadArgs;

/// Command-line client for the marquee movie catalog.
#[derive(Parser, Debug)]
#[command(name = "marquee")]
#[command(author, version = env!("MARQUEE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the backend and the stored session live.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Base URL of the catalog API
    #[arg(
        long,
        env = "MARQUEE_API_URL",
        default_value = "http://localhost:3000/api",
        global = true
    )]
    pub api_url: String,

    /// Directory holding the stored session (defaults to the platform data dir)
    #[arg(long, env = "MARQUEE_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and inspect the session
    Auth(AuthCommand),

    /// Browse and edit the catalog
    Movies(MoviesCommand),

    /// Upload a poster image
    Upload(UploadArgs),

    /// Print the embeddable player URL for a trailer link
    Trailer(TrailerArgs),
}
