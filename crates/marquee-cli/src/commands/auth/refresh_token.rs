//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, ctx: &CliContext) -> Result<()> {
    ctx.require_session()?;

    eprintln!("{}", "Refreshing session...".dimmed());

    // A failed refresh has already cleared the stored session.
    ctx.store
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    if let Some(user) = ctx.store.user() {
        output::field("Email", &user.email);
    }

    Ok(())
}
