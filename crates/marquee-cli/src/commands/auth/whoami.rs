//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use marquee_core::AuthState;

use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the session state as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WhoamiArgs, ctx: &CliContext) -> Result<()> {
    if args.json {
        return output::json(&AuthState::from(&ctx.store.session()));
    }

    ctx.require_session()?;
    let user = ctx.store.user().context("Session has no user")?;
    output::identity(&user);

    Ok(())
}
