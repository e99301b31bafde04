//! Waiting for the dataset service to finish processing

use super::types::DatasetApiConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Event emitted once the dataset service has applied a change
pub const FINALIZE_END: &str = "finalize-end";

/// Journal entries of one event type already recorded before a change
///
/// Entries are compared by content, so server timestamps are never
/// compared against the local clock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalCheckpoint {
    seen: HashSet<String>,
}

impl JournalCheckpoint {
    /// Checkpoint of a dataset with no recorded events, e.g. one about to be created
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Value>) -> Self {
        Self {
            seen: entries.into_iter().map(Value::to_string).collect(),
        }
    }

    /// Whether `entry` was not in the journal when the checkpoint was taken
    fn is_new(&self, entry: &Value) -> bool {
        !self.seen.contains(&entry.to_string())
    }
}

/// Barrier on asynchronous processing of the dataset service
///
/// Take a [`checkpoint`](Self::checkpoint) before the structural request,
/// then [`wait_for_event`](Self::wait_for_event) for an entry absent from it.
#[async_trait]
pub trait FinalizeWaiter: Send + Sync {
    /// Record the `event` entries already in the journal of `dataset_id`
    async fn checkpoint(&self, dataset_id: &str, event: &str) -> Result<JournalCheckpoint>;

    /// Resolve once an `event` entry not present in `after` is reported for `dataset_id`
    async fn wait_for_event(
        &self,
        dataset_id: &str,
        event: &str,
        after: &JournalCheckpoint,
    ) -> Result<()>;
}

/// [`FinalizeWaiter`] polling `GET /datasets/{id}/journal`
#[derive(Debug)]
pub struct JournalWaiter {
    client: HttpClient,
    poll_interval: Duration,
    timeout: Duration,
}

impl JournalWaiter {
    /// Default delay between two journal reads
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
    /// Default overall wait
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    /// Create a waiter for the given connection
    pub fn new(config: &DatasetApiConfig) -> Result<Self> {
        Ok(Self::with_client(config.http_client()?))
    }

    /// Create a waiter around an already configured HTTP client
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set the delay between two journal reads
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the overall wait
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn entries(&self, dataset_id: &str, event: &str) -> Result<Vec<Value>> {
        let url = format!("datasets/{dataset_id}/journal");
        let Some(journal) = self.client.get_json(&url, RequestConfig::new()).await? else {
            return Ok(Vec::new());
        };
        Ok(journal_events(&journal)
            .iter()
            .filter(|e| e.get("type").and_then(Value::as_str) == Some(event))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FinalizeWaiter for JournalWaiter {
    async fn checkpoint(&self, dataset_id: &str, event: &str) -> Result<JournalCheckpoint> {
        let entries = self.entries(dataset_id, event).await?;
        Ok(JournalCheckpoint::from_entries(&entries))
    }

    async fn wait_for_event(
        &self,
        dataset_id: &str,
        event: &str,
        after: &JournalCheckpoint,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            let entries = self.entries(dataset_id, event).await?;
            if entries.iter().any(|e| after.is_new(e)) {
                debug!("Dataset '{}' reported '{}'", dataset_id, event);
                return Ok(());
            }
            if tokio::time::Instant::now() + self.poll_interval > deadline {
                return Err(Error::FinalizeTimeout {
                    dataset_id: dataset_id.to_string(),
                    event: event.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn journal_events(journal: &Value) -> &[Value] {
    match journal {
        Value::Array(events) => events,
        Value::Object(map) => map
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}
