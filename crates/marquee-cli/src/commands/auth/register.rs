//! Register command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use marquee_core::Registration;

use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: RegisterArgs, ctx: &CliContext) -> Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        bail!("Name must not be empty");
    }
    let registration = Registration::new(name, args.email.trim(), &args.password);

    eprintln!("{}", "Creating account...".dimmed());

    let session = ctx
        .store
        .register(&registration)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    println!();
    if let Some(ref user) = session.user {
        output::identity(user);
    }

    Ok(())
}
