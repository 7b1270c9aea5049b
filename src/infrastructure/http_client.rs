//! Rate-limited HTTP client for page fetching.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use super::config::HttpConfig;

/// HTTP client that waits on a direct rate limiter before every request.
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .cookie_store(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("failed to build HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("rate limit must be greater than 0")?,
        );

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    /// Fetch a URL and return its body text. Non-2xx statuses are errors.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("request to {url} failed with status {}", response.status());
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("failed to read response body from {url}"))?;

        debug!(url, chars = text.len(), "page fetched");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn client_builds_from_default_config() {
        assert!(HttpClient::new(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn zero_rate_limit_is_rejected() {
        let config = HttpConfig {
            max_requests_per_second: 0,
            ..HttpConfig::default()
        };
        assert!(HttpClient::new(&config).is_err());
    }
}
