//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the crawler:
//! - Building the HTTP client with a proper user agent string
//! - GET requests returning the decoded page body
//! - Bounded retry with a fixed pause for transient failures
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Connect error / timeout / body decode | Retry after fixed delay |
//! | HTTP 429 | Retry after fixed delay |
//! | HTTP 5xx | Retry after fixed delay |
//! | Other HTTP 4xx | Immediate `FetchError::Status` |
//! | Attempts exhausted | `FetchError::RetriesExhausted` |

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::{FetchError, FetchResult};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently a request is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Fixed pause between two attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl From<&FetcherConfig> for RetryPolicy {
    fn from(config: &FetcherConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }
}

/// Builds an HTTP client with proper configuration
///
/// The user agent has the form `Name/Version (+ContactURL)`.
pub fn build_http_client(
    fetcher: &FetcherConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{})",
        user_agent.crawler_name, user_agent.crawler_version, user_agent.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(fetcher.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Runs `op` until it succeeds, fails terminally, or runs out of attempts
///
/// Retryable failures (see [`FetchError::is_retryable`]) are logged and
/// followed by a pause of `policy.delay`. Once `policy.max_attempts` is
/// reached the last failure is wrapped in `FetchError::RetriesExhausted`.
pub async fn retry_with_delay<T, F, Fut>(
    url: &str,
    policy: RetryPolicy,
    mut op: F,
) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                if attempt >= policy.max_attempts {
                    tracing::error!("Giving up on {} after {} attempts: {}", url, attempt, e);
                    return Err(FetchError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }

                tracing::warn!(
                    "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    url,
                    e,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Page fetcher shared by the month loop and the event workers
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Builds a fetcher from configuration
    pub fn new(fetcher: &FetcherConfig, user_agent: &UserAgentConfig) -> FetchResult<Self> {
        let client = build_http_client(fetcher, user_agent)?;
        Ok(Self::with_client(client, RetryPolicy::from(fetcher)))
    }

    /// Builds a fetcher around an existing client
    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches `url` and returns the response body as text
    pub async fn fetch(&self, url: &str) -> FetchResult<String> {
        tracing::debug!("GET {}", url);
        retry_with_delay(url, self.policy, || self.fetch_once(url)).await
    }

    async fn fetch_once(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }
}
