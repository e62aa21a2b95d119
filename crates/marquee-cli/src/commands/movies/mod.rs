//! Movie subcommand implementations.

mod create;
mod delete;
mod get;
mod list;
mod update;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use marquee_core::MovieId;

use crate::cli::ConnectionArgs;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct MoviesCommand {
    #[command(subcommand)]
    pub command: MoviesSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MoviesSubcommand {
    /// List one page of the catalog
    List(list::ListArgs),

    /// Show a single movie
    Get(get::GetArgs),

    /// Add a movie
    Create(create::CreateArgs),

    /// Change fields of a movie
    Update(update::UpdateArgs),

    /// Delete a movie
    Delete(delete::DeleteArgs),
}

pub async fn handle(cmd: MoviesCommand, connection: &ConnectionArgs) -> Result<()> {
    let ctx = CliContext::open(connection)?;
    match cmd.command {
        MoviesSubcommand::List(args) => list::run(args, &ctx).await,
        MoviesSubcommand::Get(args) => get::run(args, &ctx).await,
        MoviesSubcommand::Create(args) => create::run(args, &ctx).await,
        MoviesSubcommand::Update(args) => update::run(args, &ctx).await,
        MoviesSubcommand::Delete(args) => delete::run(args, &ctx).await,
    }
}

fn movie_id(raw: &str) -> Result<MovieId> {
    MovieId::new(raw.trim()).context("Invalid movie id")
}
