//! List movies command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use marquee_core::movie::non_blank;
use marquee_core::{MovieFilters, MoviesQuery};

use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Movies per page
    #[arg(long, default_value_t = 12)]
    pub limit: u32,

    /// Search titles
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub director: Option<String>,

    #[arg(long)]
    pub min_rating: Option<f64>,

    /// Released in or after this year
    #[arg(long)]
    pub year_from: Option<i32>,

    /// Released in or before this year
    #[arg(long)]
    pub year_to: Option<i32>,

    /// Minimum runtime in minutes
    #[arg(long)]
    pub min_duration: Option<u32>,

    /// Maximum runtime in minutes
    #[arg(long)]
    pub max_duration: Option<u32>,

    /// Print one JSON object per movie
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn query(&self) -> MoviesQuery {
        let filters = MovieFilters {
            genre: self.genre.clone(),
            year_from: self.year_from,
            year_to: self.year_to,
            min_rating: self.min_rating,
        };
        // Filters restart paging; an explicit --page still wins.
        let mut query = MoviesQuery {
            title: non_blank(self.title.as_deref()),
            director: non_blank(self.director.as_deref()),
            min_duration: self.min_duration,
            max_duration: self.max_duration,
            ..MoviesQuery::default()
        }
        .apply_filters(&filters);
        query.page = Some(self.page.max(1));
        query.limit = Some(self.limit.max(1));
        query
    }
}

pub async fn run(args: ListArgs, ctx: &CliContext) -> Result<()> {
    let page = ctx
        .movies()
        .list(&args.query())
        .await
        .context("Failed to list movies")?;

    if page.items.is_empty() {
        eprintln!("{}", "No movies found.".dimmed());
        return Ok(());
    }

    for movie in &page.items {
        if args.json {
            output::json(movie)?;
        } else {
            output::movie_line(movie);
        }
    }

    if !args.json {
        output::page_footer(&page);
    }

    Ok(())
}
