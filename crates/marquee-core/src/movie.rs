//! Movie records, queries and payloads.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::Result;
use crate::error::InvalidInputError;
use crate::lenient;
use crate::types::MovieId;

/// A movie as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub description: String,
    /// Runtime in minutes.
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration: u32,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub genre: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub director: String,
    #[serde(default, deserialize_with = "lenient::cast")]
    pub cast: Vec<String>,
    #[serde(default, deserialize_with = "lenient::rating")]
    pub rating: f64,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePayload {
    pub title: String,
    pub description: String,
    pub duration: u32,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub release_date: DateTime<Utc>,
    pub genre: String,
    pub director: String,
    pub cast: Vec<String>,
    pub rating: f64,
    /// URL returned by the upload service.
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
}

/// Body of an update request. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_iso_millis"
    )]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
}

impl MoviePatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Query parameters for the movie list endpoint.
///
/// Unset fields are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl MoviesQuery {
    /// A query for one page of results.
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Apply catalog filters. Changing filters always restarts at page 1.
    pub fn apply_filters(mut self, filters: &MovieFilters) -> Self {
        if let Some(genre) = filters.genre.as_deref().map(str::trim)
            && !genre.is_empty()
        {
            self.genre = Some(genre.to_lowercase());
        }
        if let Some(rating) = filters.min_rating
            && rating.is_finite()
        {
            self.min_rating = Some(rating);
        }
        if let Some(start) = filters.year_from.and_then(year_start) {
            self.start_date = Some(iso_millis(&start));
        }
        if let Some(end) = filters.year_to.and_then(year_end) {
            self.end_date = Some(iso_millis(&end));
        }
        self.page = Some(1);
        self
    }
}

/// Catalog filters as a user picks them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilters {
    pub genre: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub min_rating: Option<f64>,
}

/// One normalized page of movies.
#[derive(Debug, Clone, PartialEq)]
pub struct MoviesPage {
    pub items: Vec<Movie>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl MoviesPage {
    /// Number of pages, never less than one.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.limit)).max(1)
    }
}

/// Split a comma-separated cast list, trimming names and dropping blanks.
pub fn parse_cast(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a `YYYY-MM-DD` release day as midnight UTC.
pub fn release_date_from_day(day: &str) -> Result<DateTime<Utc>> {
    let invalid = || InvalidInputError::Date {
        value: day.to_string(),
    };
    let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    Ok(midnight.and_utc())
}

/// Returns the trimmed value, or `None` if it is blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Format a timestamp the way the backend expects: RFC 3339, millisecond
/// precision, `Z` suffix.
pub fn iso_millis(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn year_start(year: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()
}

fn year_end(year: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
        .map(|dt| dt.and_utc())
}

fn serialize_iso_millis<S: Serializer>(
    at: &DateTime<Utc>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&iso_millis(at))
}

fn serialize_opt_iso_millis<S: Serializer>(
    at: &Option<DateTime<Utc>>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match at {
        Some(at) => serialize_iso_millis(at, s),
        None => s.serialize_none(),
    }
}
