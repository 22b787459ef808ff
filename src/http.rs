//! Shared HTTP client construction for provider adapters

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::{PlacecastError, Result};

const USER_AGENT: &str = concat!("placecast/", env!("CARGO_PKG_VERSION"));

/// Build a client that retries transient failures with exponential backoff.
///
/// No request timeout is set; only device geolocation is time-boxed.
pub fn build_client(max_retries: u32) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| PlacecastError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Strip query parameters that carry credentials before logging a URL
pub(crate) fn redact(url: &str) -> &str {
    url.split(['?', '&'])
        .next()
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client() {
        assert!(build_client(0).is_ok());
        assert!(build_client(3).is_ok());
    }

    #[test]
    fn test_redact_drops_query() {
        assert_eq!(
            redact("https://example.com/geocode/json?latlng=1,2&key=secret"),
            "https://example.com/geocode/json"
        );
        assert_eq!(redact("https://example.com/path"), "https://example.com/path");
    }
}
