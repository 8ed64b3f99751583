//! Resilient request client
//!
//! Key design: callers only distinguish success from failure. Rate limits are
//! retried here with exponential backoff; every other failure is reported as
//! a bare `RequestFailed` and the status/body only reach the debug log.

use crate::executor::{HttpExecutor, HttpMethod};
use crate::retry::RetryPolicy;
use megaverse_core::{MegaverseError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Client wrapping every Megaverse REST call in the retry policy
#[derive(Debug, Clone)]
pub struct RequestClient<E: HttpExecutor> {
    executor: E,
    policy: RetryPolicy,
}

impl<E: HttpExecutor> RequestClient<E> {
    /// Create a client with the default policy (5 retries from 1000 ms)
    pub fn new(executor: E) -> Self {
        Self::with_policy(executor, RetryPolicy::default())
    }

    pub fn with_policy(executor: E, policy: RetryPolicy) -> Self {
        Self { executor, policy }
    }

    /// Issue one logical request, returning the raw response body
    #[instrument(skip(self, body))]
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String> {
        let mut attempt = 0;

        loop {
            let response = match self.executor.send(method, url, body.as_ref()).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("Transport error: {}", e);
                    return Err(MegaverseError::RequestFailed);
                }
            };

            if response.is_success() {
                return Ok(response.body);
            }

            if !response.is_rate_limited() {
                debug!("Request failed with status {}: {}", response.status, response.body);
                return Err(MegaverseError::RequestFailed);
            }

            if attempt >= self.policy.max_retries {
                warn!(
                    "Rate limit persisted after {} retries, giving up",
                    self.policy.max_retries
                );
                return Err(MegaverseError::MaxRetriesExceeded {
                    retries: self.policy.max_retries,
                });
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                "Retry {}/{}: waiting for {} milliseconds",
                attempt + 1,
                self.policy.max_retries,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// GET and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.execute(HttpMethod::Get, url, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body, discarding the response
    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let body = serde_json::to_value(body)?;
        self.execute(HttpMethod::Post, url, Some(body)).await?;
        Ok(())
    }

    /// DELETE with a JSON body, discarding the response
    pub async fn delete<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let body = serde_json::to_value(body)?;
        self.execute(HttpMethod::Delete, url, Some(body)).await?;
        Ok(())
    }
}
