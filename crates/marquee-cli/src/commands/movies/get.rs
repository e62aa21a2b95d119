//! Get movie command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Movie id
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: GetArgs, ctx: &CliContext) -> Result<()> {
    let id = super::movie_id(&args.id)?;
    let movie = ctx
        .movies()
        .get(&id)
        .await
        .context("Failed to fetch movie")?;

    if args.json {
        output::json_pretty(&movie)?;
    } else {
        output::movie_details(&movie);
    }

    Ok(())
}
