//! Delete movie command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Movie id
    pub id: String,
}

pub async fn run(args: DeleteArgs, ctx: &CliContext) -> Result<()> {
    ctx.require_session()?;
    let id = super::movie_id(&args.id)?;

    ctx.movies()
        .remove(&id)
        .await
        .context("Failed to delete movie")?;

    output::success(&format!("Deleted {id}"));
    Ok(())
}
