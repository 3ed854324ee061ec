//! Retrying HTTP GET client shared by every pipeline stage.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::RetryPolicy;
use crate::error::HunterError;

/// Result of a fetch that went through the retry loop.
///
/// Upstream rejections (non-2xx) are never retried and carry no body; callers
/// in this crate always treat them as "no data". Transport failures are only
/// reported once every attempt has been spent.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Success(T),
    UpstreamRejected(StatusCode),
    TransportFailed(HunterError),
}

impl<T> FetchOutcome<T> {
    /// Collapses the outcome to `Some(value)` on success, `None` otherwise.
    pub fn ok(self) -> Option<T> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// HTTP client wrapper that applies the soft-fail/hard-retry policy.
pub struct FetchClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl FetchClient {
    /// Create a new fetch client.
    ///
    /// # Arguments
    /// * `user_agent` - Sent with every request, MusicBrainz rejects anonymous clients
    /// * `timeout` - Per-request connect + read timeout
    /// * `retry` - Backoff schedule for transport failures
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, retry })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// GET `url` with `query` and deserialize the JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> FetchOutcome<T> {
        self.get_with_retry(url, query, |response| response.json::<T>())
            .await
    }

    /// GET `url` and return the raw body.
    pub async fn fetch_bytes(&self, url: &str) -> FetchOutcome<Vec<u8>> {
        self.get_with_retry(url, &[], |response| async move {
            response.bytes().await.map(|body| body.to_vec())
        })
        .await
    }

    async fn get_with_retry<T, F, Fut>(
        &self,
        url: &str,
        query: &[(&str, String)],
        read_body: F,
    ) -> FetchOutcome<T>
    where
        F: Fn(Response) -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let error = match self.client.get(url).query(query).send().await {
                Ok(response) if !response.status().is_success() => {
                    let status = response.status();
                    warn!("Failed to fetch data from {}, status code: {}", url, status);
                    return FetchOutcome::UpstreamRejected(status);
                }
                Ok(response) => match read_body(response).await {
                    Ok(value) => return FetchOutcome::Success(value),
                    Err(e) => e,
                },
                Err(e) => e,
            };

            if !self.retry.should_retry(attempts) {
                return FetchOutcome::TransportFailed(HunterError::Transport {
                    url: url.to_string(),
                    attempts,
                    source: error,
                });
            }

            let delay = self.retry.backoff(attempts - 1);
            debug!(
                "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                attempts, self.retry.max_attempts, url, error, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
