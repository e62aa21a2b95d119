//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use marquee_core::trailer::embed_url;
use marquee_core::{Identity, Movie, MoviesPage};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn identity(user: &Identity) {
    field("Name", &user.name);
    field("Email", &user.email);
    field("Id", &user.id);
}

/// One line per movie: title, year, rating and id.
pub fn movie_line(movie: &Movie) {
    let year = movie
        .release_date
        .map(|d| format!(" ({})", d.format("%Y")))
        .unwrap_or_default();
    println!(
        "{}{}  {} {:.1}  {}",
        movie.title.bold(),
        year,
        "★".yellow(),
        movie.rating,
        format!("[{}]", movie.id).dimmed()
    );
}

pub fn movie_details(movie: &Movie) {
    println!("{}", movie.title.bold());
    if let Some(ref tagline) = movie.tagline {
        println!("{}", tagline.italic());
    }
    println!();
    field("Id", movie.id.as_str());
    field("Director", &movie.director);
    field("Genre", &movie.genre);
    if let Some(date) = movie.release_date {
        field("Released", &date.format("%Y-%m-%d").to_string());
    }
    field("Duration", &format!("{} min", movie.duration));
    field("Rating", &format!("{:.1}", movie.rating));
    if !movie.cast.is_empty() {
        field("Cast", &movie.cast.join(", "));
    }
    if !movie.image_url.is_empty() {
        field("Poster", &movie.image_url);
    }
    if let Some(trailer) = movie.trailer_url.as_deref().and_then(embed_url) {
        field("Trailer", &trailer);
    }
    if !movie.description.is_empty() {
        println!();
        println!("{}", movie.description);
    }
}

/// Page position, on stderr so stdout stays one movie per line.
pub fn page_footer(page: &MoviesPage) {
    eprintln!();
    eprintln!(
        "{}",
        format!(
            "Page {} of {} ({} movies)",
            page.page,
            page.total_pages(),
            page.total
        )
        .dimmed()
    );
}
