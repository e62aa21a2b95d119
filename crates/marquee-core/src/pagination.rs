//! Normalization of list responses into [`MoviesPage`].
//!
//! The backend has shipped several list shapes: a bare array, arrays under
//! assorted keys, arrays nested under `data`, and totals in a header or in
//! one of many metadata keys. Each lookup below tries a fixed list of
//! locations in order and falls back to what the request asked for.

use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::error::DecodeError;
use crate::lenient::as_f64;
use crate::movie::{Movie, MoviesPage, MoviesQuery};

/// Keys that may hold the item array, in lookup order.
const ITEM_KEYS: &[&str] = &[
    "data", "items", "movies", "results", "content", "list", "records", "rows", "docs",
    "payload", "value", "Data", "Items", "Movies", "Results",
];

const TOTAL_PATHS: &[&str] = &[
    "total",
    "count",
    "totalCount",
    "totalElements",
    "Total",
    "TotalCount",
    "pagination.total",
    "pagination.totalItems",
    "meta.total",
    "meta.totalItems",
    "pageInfo.total",
];

const PAGE_PATHS: &[&str] = &[
    "page",
    "currentPage",
    "Pagination.page",
    "pagination.page",
    "meta.page",
    "meta.currentPage",
    "pageInfo.page",
];

const LIMIT_PATHS: &[&str] = &[
    "limit",
    "perPage",
    "pageSize",
    "pagination.limit",
    "pagination.perPage",
    "meta.limit",
    "meta.perPage",
    "pageInfo.pageSize",
];

/// Build a page from a list response body and its `x-total-count` header.
///
/// # Errors
///
/// Returns a [`DecodeError`] if an item in the located array is not a movie.
pub fn normalize_page(
    body: &Value,
    total_header: Option<&str>,
    query: &MoviesQuery,
) -> Result<MoviesPage> {
    let items = extract_items(body)
        .iter()
        .map(|item| Movie::deserialize(item).map_err(|e| DecodeError::Json(e).into()))
        .collect::<Result<Vec<_>>>()?;
    let count = items.len();

    let total = total_header
        .and_then(|h| number(&Value::String(h.to_string())))
        .or_else(|| first_number(body, TOTAL_PATHS))
        .unwrap_or(count as u64);

    let page = first_number(body, PAGE_PATHS)
        .and_then(|p| u32::try_from(p).ok())
        .or(query.page)
        .unwrap_or(1);

    let limit = first_number(body, LIMIT_PATHS)
        .and_then(|l| u32::try_from(l).ok())
        .or(query.limit)
        .unwrap_or(u32::try_from(count).unwrap_or(u32::MAX));

    Ok(MoviesPage {
        items,
        total,
        page,
        limit,
    })
}

/// Locate the item array in a list response.
pub fn extract_items(body: &Value) -> &[Value] {
    match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => extract_from_object(body),
        _ => &[],
    }
}

fn extract_from_object(obj: &Value) -> &[Value] {
    if let Some(items) = ITEM_KEYS
        .iter()
        .find_map(|key| obj.get(key).and_then(Value::as_array))
    {
        return items.as_slice();
    }

    if let Some(nested) = obj
        .get("data")
        .or_else(|| obj.get("Data"))
        .filter(|v| v.is_object())
    {
        return extract_from_object(nested);
    }

    obj.as_object()
        .and_then(|map| map.values().find_map(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Unwrap a `{ "data": ... }` envelope, if present.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            Some(data) => {
                map.insert("data".to_string(), data);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

fn first_number(body: &Value, paths: &[&str]) -> Option<u64> {
    paths
        .iter()
        .filter_map(|path| lookup(body, path))
        .find_map(number)
}

fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(body, |cur, part| cur.get(part))
        .filter(|v| !v.is_null())
}

/// Non-negative numbers and numeric strings.
fn number(value: &Value) -> Option<u64> {
    as_f64(value)
        .filter(|n| *n >= 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn movie(id: u32) -> Value {
        json!({ "id": id.to_string(), "title": format!("Movie {id}") })
    }

    #[test]
    fn bare_array_falls_back_to_request() {
        let body = json!([movie(1), movie(2)]);
        let page = normalize_page(&body, None, &MoviesQuery::page(3, 10)).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 2);
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn standard_envelope_with_pagination_meta() {
        let body = json!({
            "success": true,
            "data": [movie(1)],
            "pagination": { "total": 41, "page": 2, "limit": 20 }
        });
        let page = normalize_page(&body, None, &MoviesQuery::default()).unwrap();

        assert_eq!(page.items[0].title, "Movie 1");
        assert_eq!(page.total, 41);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 20);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn nested_data_object_is_searched() {
        let body = json!({
            "data": { "movies": [movie(1), movie(2), movie(3)], "totalCount": "57" },
            "meta": { "currentPage": 4, "perPage": 3 }
        });
        let page = normalize_page(&body, None, &MoviesQuery::default()).unwrap();

        assert_eq!(page.items.len(), 3);
        // totalCount lives under data, which is not a listed total path
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 4);
        assert_eq!(page.limit, 3);
    }

    #[test]
    fn header_total_wins_over_body() {
        let body = json!({ "items": [movie(1)], "total": 5 });
        let page = normalize_page(&body, Some("120"), &MoviesQuery::default()).unwrap();
        assert_eq!(page.total, 120);

        let page = normalize_page(&body, Some("lots"), &MoviesQuery::default()).unwrap();
        assert_eq!(page.total, 5);
    }

    #[test]
    fn first_array_property_is_last_resort() {
        let body = json!({ "ok": true, "films": [movie(9)] });
        assert_eq!(extract_items(&body).len(), 1);
    }

    #[test]
    fn listed_keys_win_over_unlisted_arrays() {
        let body = json!({ "genres": ["drama"], "results": [movie(1), movie(2)] });
        assert_eq!(extract_items(&body).len(), 2);
    }

    #[test]
    fn no_array_yields_empty_page() {
        let body = json!({ "message": "nothing here" });
        let page = normalize_page(&body, None, &MoviesQuery::default()).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 0);
    }

    #[test]
    fn non_numeric_meta_is_skipped() {
        let body = json!({ "items": [], "total": "n/a", "count": 8, "limit": -1 });
        let page = normalize_page(&body, None, &MoviesQuery::page(1, 10)).unwrap();
        assert_eq!(page.total, 8);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn malformed_item_is_a_decode_error() {
        let body = json!({ "items": [{ "title": "no id" }] });
        assert!(normalize_page(&body, None, &MoviesQuery::default()).is_err());
    }

    #[test]
    fn items_with_null_fields_do_not_fail_the_page() {
        let body = json!({
            "data": [
                { "id": "m1", "title": "Ok" },
                { "id": "m2", "title": "Nulls", "description": null, "rating": null, "cast": null },
                { "id": 7, "title": "Decimal", "rating": "8.5", "duration": "117" }
            ]
        });
        let page = normalize_page(&body, None, &MoviesQuery::default()).unwrap();

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[1].description, "");
        assert_eq!(page.items[1].rating, 0.0);
        assert!(page.items[1].cast.is_empty());
        assert_eq!(page.items[2].rating, 8.5);
        assert_eq!(page.items[2].duration, 117);
    }

    #[test]
    fn envelope_unwrapping() {
        assert_eq!(unwrap_envelope(json!({"data": movie(1)})), movie(1));
        assert_eq!(unwrap_envelope(movie(2)), movie(2));
        assert_eq!(
            unwrap_envelope(json!({"data": null, "id": "3"})),
            json!({"data": null, "id": "3"})
        );
    }
}
