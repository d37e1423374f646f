//! Chunked batch writes with bounded retry of unprocessed requests.

use std::time::Duration;

use tracing::{debug, warn};

use super::chunk::chunk;
use crate::config::WriteConfig;
use crate::error::Error;
use crate::record::Item;
use crate::store::{KeyValueStore, WriteRequest};

/// Exponential backoff policy for unprocessed or throttled requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl From<&WriteConfig> for RetryPolicy {
    fn from(config: &WriteConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

/// Result of a batch write.
#[derive(Debug, Default)]
pub struct WriteOutcome {
    /// Requests still unprocessed once retries ran out.
    pub unprocessed: Vec<WriteRequest>,
    /// Failures, one per chunk that could not be written.
    pub errors: Vec<Error>,
}

/// Writes item lists in store-sized chunks.
pub struct BatchWriter<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    table: &'a str,
    batch_size: usize,
    policy: RetryPolicy,
}

impl<'a, S: KeyValueStore + ?Sized> BatchWriter<'a, S> {
    /// Creates a writer for `table`.
    #[must_use]
    pub fn new(store: &'a S, table: &'a str, batch_size: usize, policy: RetryPolicy) -> Self {
        Self {
            store,
            table,
            batch_size,
            policy,
        }
    }

    /// Writes every item. A failing chunk never stops the remaining chunks.
    #[tracing::instrument(skip_all, fields(table = self.table, items = items.len()))]
    pub async fn write(&self, items: &[Item]) -> WriteOutcome {
        let mut outcome = WriteOutcome::default();
        for (index, part) in chunk(items, self.batch_size).into_iter().enumerate() {
            let requests = part
                .iter()
                .map(|item| WriteRequest::put(item.to_attributes()))
                .collect();
            let (unprocessed, error) = self.write_chunk(requests).await;
            if let Some(error) = error {
                warn!(chunk = index, error = %error, "batch write chunk failed");
                outcome.errors.push(error);
            }
            outcome.unprocessed.extend(unprocessed);
        }
        debug!(
            unprocessed = outcome.unprocessed.len(),
            errors = outcome.errors.len(),
            "batch write finished"
        );
        outcome
    }

    async fn write_chunk(&self, mut pending: Vec<WriteRequest>) -> (Vec<WriteRequest>, Option<Error>) {
        let mut attempt = 0;
        loop {
            let last_error = match self.store.batch_write(self.table, pending.clone()).await {
                Ok(unprocessed) if unprocessed.is_empty() => return (Vec::new(), None),
                Ok(unprocessed) => {
                    pending = unprocessed;
                    None
                }
                Err(error) if error.is_retryable() => Some(error),
                Err(error) => return (Vec::new(), Some(error)),
            };

            if attempt >= self.policy.max_retries {
                warn!(
                    remaining = pending.len(),
                    attempts = attempt + 1,
                    "retries exhausted, returning unprocessed requests"
                );
                return (pending, last_error);
            }
            let delay = self.policy.delay(attempt);
            debug!(remaining = pending.len(), attempt, ?delay, "retrying batch write");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
