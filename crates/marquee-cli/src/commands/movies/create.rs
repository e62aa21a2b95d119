//! Create movie command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use marquee_core::MoviePayload;
use marquee_core::movie::{non_blank, parse_cast, release_date_from_day};

use crate::commands::upload::upload_file;
use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Runtime in minutes
    #[arg(long)]
    pub duration: u32,

    /// Release day as YYYY-MM-DD
    #[arg(long)]
    pub release_date: String,

    #[arg(long)]
    pub genre: String,

    #[arg(long)]
    pub director: String,

    /// Comma-separated cast list
    #[arg(long, default_value = "")]
    pub cast: String,

    #[arg(long, default_value_t = 0.0)]
    pub rating: f64,

    /// Poster URL
    #[arg(long, required_unless_present = "image", conflicts_with = "image")]
    pub image_url: Option<String>,

    /// Poster file to upload first
    #[arg(long)]
    pub image: Option<PathBuf>,

    #[arg(long)]
    pub trailer_url: Option<String>,

    #[arg(long)]
    pub tagline: Option<String>,
}

pub async fn run(args: CreateArgs, ctx: &CliContext) -> Result<()> {
    ctx.require_session()?;

    let release_date = release_date_from_day(&args.release_date).context("Invalid release date")?;
    let image_url = match (args.image_url, args.image) {
        (Some(url), _) => url,
        (None, Some(path)) => upload_file(ctx, &path).await?,
        (None, None) => String::new(),
    };

    let payload = MoviePayload {
        title: args.title.trim().to_string(),
        description: args.description.trim().to_string(),
        duration: args.duration,
        release_date,
        genre: args.genre.trim().to_string(),
        director: args.director.trim().to_string(),
        cast: parse_cast(&args.cast),
        rating: args.rating,
        image_url,
        trailer_url: non_blank(args.trailer_url.as_deref()),
        tagline: non_blank(args.tagline.as_deref()),
    };

    let movie = ctx
        .movies()
        .create(&payload)
        .await
        .context("Failed to create movie")?;

    output::success("Movie created");
    output::field("Id", movie.id.as_str());
    output::field("Title", &movie.title);

    Ok(())
}
