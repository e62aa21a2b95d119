//! Endpoint paths and wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use marquee_core::Identity;
use marquee_core::error::FieldError;

pub const AUTH_REGISTER: &str = "auth/register";
pub const AUTH_LOGIN: &str = "auth/login";
pub const AUTH_REFRESH: &str = "auth/refresh";
pub const MOVIES: &str = "movies";
pub const UPLOAD_IMAGE: &str = "upload/image";

/// Header some backends use to report the unpaginated result count.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Path of a single movie.
pub fn movie(id: &marquee_core::MovieId) -> String {
    format!("{}/{}", MOVIES, id)
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// `{ success, message, data?: { user, tokens }, errors? }`
#[derive(Debug, Deserialize)]
pub(crate) struct AuthEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<AuthData>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthData {
    #[serde(default)]
    pub user: Option<Identity>,
    pub tokens: TokensBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokensBody {
    pub access_token: String,
    pub refresh_token: String,
}

/// Find the uploaded image URL in an upload response.
///
/// Checked in order: `data.imageUrl`, `imageUrl`, `url`. Empty strings do
/// not count.
pub fn image_url(body: &Value) -> Option<String> {
    [
        body.get("data").and_then(|d| d.get("imageUrl")),
        body.get("imageUrl"),
        body.get("url"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .find(|url| !url.is_empty())
    .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_url_lookup_order() {
        assert_eq!(
            image_url(&json!({"data": {"imageUrl": "a"}, "imageUrl": "b"})).as_deref(),
            Some("a")
        );
        assert_eq!(
            image_url(&json!({"data": {"imageUrl": ""}, "url": "c"})).as_deref(),
            Some("c")
        );
        assert_eq!(image_url(&json!({"success": true})), None);
    }

    #[test]
    fn movie_path() {
        let id = marquee_core::MovieId::new("m-1").unwrap();
        assert_eq!(movie(&id), "movies/m-1");
    }
}
