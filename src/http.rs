//! Shared HTTP client construction and response checks for the external APIs.

use crate::{Result, TripCreatorError};
use reqwest::{Response, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use tracing::{error, warn};

const USER_AGENT: &str = concat!("TripCreator/", env!("CARGO_PKG_VERSION"));

/// Longest pause between two retries of the same request.
pub const MAX_RETRY_INTERVAL_SECONDS: u32 = 10;

/// Upper bound on wall-clock time for one logical request, counting every
/// retry attempt and the pauses between them.
#[must_use]
pub fn worst_case_seconds(timeout_seconds: u32, max_retries: u32) -> u64 {
    let attempts = u64::from(max_retries) + 1;
    u64::from(timeout_seconds) * attempts
        + u64::from(max_retries) * u64::from(MAX_RETRY_INTERVAL_SECONDS)
}

/// Build a client with a request timeout and transient-failure retries.
pub fn build_client(timeout_seconds: u32, max_retries: u32) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TripCreatorError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(
            Duration::from_millis(500),
            Duration::from_secs(MAX_RETRY_INTERVAL_SECONDS.into()),
        )
        .build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Map a non-success response to an API error, keeping the status and body text.
pub async fn ensure_success(response: Response, service: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status.as_u16() {
        401 | 403 => {
            error!("{} rejected the credentials (HTTP {})", service, status);
            Err(TripCreatorError::api(format!(
                "{service} rejected the credentials (HTTP {status})"
            )))
        }
        429 => {
            warn!("{} rate limit exceeded", service);
            Err(TripCreatorError::api(format!("{service} rate limit exceeded")))
        }
        _ => {
            warn!("{} returned HTTP {}: {}", service, status, body);
            Err(TripCreatorError::api(format!(
                "{service} request failed with status {status}: {body}"
            )))
        }
    }
}

/// Strip secrets from a URL before it is logged.
#[must_use]
pub fn redact_key(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return "<unparseable url>".to_string();
    };
    if !parsed.query_pairs().any(|(name, _)| name == "key") {
        return parsed.into();
    }

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == "key" {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_key_in_middle() {
        let url = "https://example.com/search?q=tokyo&key=secret&cx=abc";
        assert_eq!(
            redact_key(url),
            "https://example.com/search?q=tokyo&key=***&cx=abc"
        );
    }

    #[test]
    fn test_redact_key_at_end() {
        let url = "https://example.com/geocode?address=x&key=secret";
        assert_eq!(redact_key(url), "https://example.com/geocode?address=x&key=***");
    }

    #[test]
    fn test_redact_key_absent() {
        assert_eq!(redact_key("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn test_redact_key_ignores_lookalike_names() {
        // only the exact "key" parameter is a secret
        let url = "https://example.com/search?monkey=banana&key=secret";
        assert_eq!(
            redact_key(url),
            "https://example.com/search?monkey=banana&key=***"
        );
    }

    #[test]
    fn test_redact_key_unparseable() {
        assert_eq!(redact_key("key=secret"), "<unparseable url>");
    }

    #[test]
    fn test_worst_case_seconds() {
        assert_eq!(worst_case_seconds(30, 0), 30);
        assert_eq!(worst_case_seconds(120, 2), 120 * 3 + 2 * 10);
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(5, 0).is_ok());
    }
}
