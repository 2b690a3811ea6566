// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Whether a request may carry the given `Content-Type`.
///
/// Parameters such as `charset` are ignored and the comparison is
/// case-insensitive.
pub fn media_type_matches(content_type: &str, accepted: &[&str]) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();
    accepted
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(media_type))
}
