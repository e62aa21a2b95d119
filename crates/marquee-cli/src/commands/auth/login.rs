//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use marquee_core::Credentials;

use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs, ctx: &CliContext) -> Result<()> {
    let credentials = Credentials::new(args.email.trim(), &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let session = ctx
        .store
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    if let Some(ref user) = session.user {
        output::identity(user);
    }

    Ok(())
}
