//! Trailer command implementation.

use anyhow::{Result, bail};
use clap::Args;

use marquee_core::trailer::embed_url;

#[derive(Args, Debug)]
pub struct TrailerArgs {
    /// YouTube, Vimeo or other http(s) video link
    pub url: String,
}

pub fn run(args: TrailerArgs) -> Result<()> {
    match embed_url(&args.url) {
        Some(url) => {
            println!("{url}");
            Ok(())
        }
        None => bail!("Not a playable trailer URL: {}", args.url),
    }
}
