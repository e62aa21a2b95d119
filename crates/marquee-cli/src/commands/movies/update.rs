//! Update movie command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use marquee_core::MoviePatch;
use marquee_core::movie::{non_blank, parse_cast, release_date_from_day};

use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Movie id
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Runtime in minutes
    #[arg(long)]
    pub duration: Option<u32>,

    /// Release day as YYYY-MM-DD
    #[arg(long)]
    pub release_date: Option<String>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub director: Option<String>,

    /// Comma-separated cast list
    #[arg(long)]
    pub cast: Option<String>,

    #[arg(long)]
    pub rating: Option<f64>,

    #[arg(long)]
    pub image_url: Option<String>,

    #[arg(long)]
    pub trailer_url: Option<String>,

    #[arg(long)]
    pub tagline: Option<String>,
}

impl UpdateArgs {
    fn patch(&self) -> Result<MoviePatch> {
        let release_date = self
            .release_date
            .as_deref()
            .map(release_date_from_day)
            .transpose()
            .context("Invalid release date")?;

        Ok(MoviePatch {
            title: non_blank(self.title.as_deref()),
            description: self.description.clone(),
            duration: self.duration,
            release_date,
            genre: non_blank(self.genre.as_deref()),
            director: non_blank(self.director.as_deref()),
            cast: self.cast.as_deref().map(parse_cast),
            rating: self.rating,
            image_url: non_blank(self.image_url.as_deref()),
            trailer_url: non_blank(self.trailer_url.as_deref()),
            tagline: self.tagline.clone(),
        })
    }
}

pub async fn run(args: UpdateArgs, ctx: &CliContext) -> Result<()> {
    ctx.require_session()?;
    let id = super::movie_id(&args.id)?;

    let patch = args.patch()?;
    if patch.is_empty() {
        bail!("Nothing to update");
    }

    let movie = ctx
        .movies()
        .update(&id, &patch)
        .await
        .context("Failed to update movie")?;

    output::success("Movie updated");
    output::field("Id", movie.id.as_str());
    output::field("Title", &movie.title);

    Ok(())
}
