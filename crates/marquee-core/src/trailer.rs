//! Trailer URL to embeddable player URL.

use url::Url;

/// Convert a trailer link into a URL suitable for an embedded player.
///
/// YouTube watch, shorts and `youtu.be` links become
/// `https://www.youtube.com/embed/<id>`; numeric Vimeo links become
/// `https://player.vimeo.com/video/<id>`. Links that are already embed URLs,
/// and any other http(s) URL, are returned unchanged. Anything that does not
/// parse as an http(s) URL yields `None`.
///
/// # Example
///
/// ```
/// use marquee_core::trailer::embed_url;
///
/// assert_eq!(
///     embed_url("https://youtu.be/dQw4w9WgXcQ").as_deref(),
///     Some("https://www.youtube.com/embed/dQw4w9WgXcQ"),
/// );
/// ```
pub fn embed_url(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let path = url.path();

    if host.contains("youtube.com") && path.starts_with("/embed/") {
        return Some(url.to_string());
    }
    if host.contains("player.vimeo.com") && path.starts_with("/video/") {
        return Some(url.to_string());
    }

    if host.contains("youtube.com") {
        if let Some((_, id)) = url.query_pairs().find(|(k, v)| k == "v" && !v.is_empty()) {
            return Some(youtube(&id));
        }
        let mut segments = segments(&url);
        if let (Some("shorts"), Some(id)) = (segments.next(), segments.next()) {
            return Some(youtube(id));
        }
    }

    if host == "youtu.be"
        && let Some(id) = path.strip_prefix('/').filter(|id| !id.is_empty())
    {
        return Some(youtube(id));
    }

    if host.contains("vimeo.com")
        && let Some(id) = segments(&url).next()
        && id.chars().all(|c| c.is_ascii_digit())
    {
        return Some(format!("https://player.vimeo.com/video/{id}"));
    }

    Some(url.to_string())
}

fn youtube(id: &str) -> String {
    format!("https://www.youtube.com/embed/{id}")
}

fn segments(url: &Url) -> impl Iterator<Item = &str> {
    url.path().split('/').filter(|s| !s.is_empty())
}
