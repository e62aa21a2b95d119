//! Auth subcommand implementations.

mod login;
mod logout;
mod refresh_token;
mod register;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::ConnectionArgs;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in with email and password
    Login(login::LoginArgs),

    /// Create an account and sign in
    Register(register::RegisterArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the signed-in user
    Whoami(whoami::WhoamiArgs),

    /// Exchange the refresh token for new tokens
    RefreshToken(refresh_token::RefreshTokenArgs),
}

pub async fn handle(cmd: AuthCommand, connection: &ConnectionArgs) -> Result<()> {
    let ctx = CliContext::open(connection)?;
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(args, &ctx).await,
        AuthSubcommand::Register(args) => register::run(args, &ctx).await,
        AuthSubcommand::Logout(args) => logout::run(args, &ctx),
        AuthSubcommand::Whoami(args) => whoami::run(args, &ctx),
        AuthSubcommand::RefreshToken(args) => refresh_token::run(args, &ctx).await,
    }
}
