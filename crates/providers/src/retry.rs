//! Bounded retry with a per-attempt timeout.
//!
//! Every provider built by the factory is wrapped in a [`RetryProvider`], so
//! transient failures (network, timeout, rate limit, 5xx) are retried a fixed
//! number of times before the error reaches the agent loop.

use async_trait::async_trait;
use jamespot_core::error::ProviderError;
use jamespot_core::provider::*;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Retries allowed after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound for a single attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// A provider that retries transient failures of an inner provider.
pub struct RetryProvider {
    inner: Arc<dyn jamespot_core::Provider>,
    max_retries: u32,
    timeout: Duration,
    backoff: Duration,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn jamespot_core::Provider>) -> Self {
        Self {
            inner,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base delay between attempts; attempt `n` waits `n * backoff`.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run<T, F, Fut>(&self, op: &str, mut attempt_fn: F) -> std::result::Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, attempt_fn()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(format!(
                    "Provider '{}' timed out after {}s",
                    self.inner.name(),
                    self.timeout.as_secs()
                ))),
            };

            match result {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        provider = %self.inner.name(),
                        op,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Transient provider failure, retrying"
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl jamespot_core::Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn chunk_mode(&self) -> ChunkMode {
        self.inner.chunk_mode()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        self.run("complete", || self.inner.complete(request.clone())).await
    }

    /// Only opening the stream is retried; a stream that breaks midway
    /// surfaces as an error chunk.
    async fn stream(&self, request: ProviderRequest) -> std::result::Result<ChunkReceiver, ProviderError> {
        self.run("stream", || self.inner.stream(request.clone())).await
    }
}
