// src/http/query.rs

//! Query-string helpers.

use actix_web::web::Query;

/// Read `difficulty` from a raw query string.
///
/// The first `difficulty` pair wins. A missing key, a value that is not a
/// decimal integer (optionally signed), or an undecodable pair all fall back
/// to `default`; none of them is an error.
pub fn difficulty_from_query(query: &str, default: i64) -> i64 {
    first_value(query, "difficulty")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

/// First value for `key`, decoding each `&`-separated pair on its own so one
/// malformed pair does not hide the others.
fn first_value(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let Query(decoded) = Query::<Vec<(String, String)>>::from_query(pair).ok()?;
            decoded.into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
        })
}
