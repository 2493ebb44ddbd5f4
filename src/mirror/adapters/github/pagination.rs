//! Link-header pagination and rate-limit detection.

use crate::mirror::ports::RemoteHostError;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, LINK};
use url::Url;

/// Header carrying the number of requests left in the current window.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Header carrying the window reset time in epoch seconds.
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Returns the URL of the `rel="next"` relation in a `Link` header.
///
/// # Examples
///
///     use reqwest::header::{HeaderMap, HeaderValue, LINK};
///     use repo_mirror::mirror::adapters::github::next_link;
///
///     let mut headers = HeaderMap::new();
///     headers.insert(
///         LINK,
///         HeaderValue::from_static(
///             "<https://api.example.com/user/repos?page=2>; rel=\"next\", \
///              <https://api.example.com/user/repos?page=5>; rel=\"last\"",
///         ),
///     );
///     let next = next_link(&headers).expect("next relation");
///     assert_eq!(next.as_str(), "https://api.example.com/user/repos?page=2");
#[must_use]
pub fn next_link(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(parse_next_relation)
}

fn parse_next_relation(entry: &str) -> Option<Url> {
    let mut parts = entry.split(';');
    let target = parts.next()?.trim();
    let is_next = parts.any(|param| {
        let mut pair = param.splitn(2, '=');
        let key = pair.next().map(str::trim);
        let value = pair.next().map(|raw| raw.trim().trim_matches('"'));
        key == Some("rel")
            && value.is_some_and(|rels| rels.split_whitespace().any(|rel| rel == "next"))
    });
    if !is_next {
        return None;
    }
    let url = target.strip_prefix('<')?.strip_suffix('>')?;
    Url::parse(url).ok()
}

/// Fails with [`RemoteHostError::RateLimited`] when the quota is exhausted.
///
/// The wait is the distance from `now` to the reported reset instant,
/// saturating at zero.
///
/// # Errors
///
/// Returns [`RemoteHostError::RateLimited`] when the remaining-requests
/// header reads `0`.
pub fn check_rate_limit(headers: &HeaderMap, now: DateTime<Utc>) -> Result<(), RemoteHostError> {
    let remaining = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|value| value.to_str().ok())
        .map(str::trim);
    if remaining != Some("0") {
        return Ok(());
    }

    let reset_at = headers
        .get(RATE_LIMIT_RESET)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0));
    let retry_after = reset_at
        .and_then(|reset| (reset - now).to_std().ok())
        .unwrap_or_default();

    Err(RemoteHostError::RateLimited {
        retry_after,
        reset_at,
    })
}
