//! Historical backfill: reconcile the store with platform history after
//! downtime by paginating backward from now until known ground is reached.

use std::sync::Arc;

use tracing::{debug, info};

use {
    chronicle_common::time::now_ms,
    chronicle_platform::{PlatformClient, RetryPolicy, retry_transient},
    chronicle_store::MessageStore,
};

use crate::error::{Error, Result};

/// What a backfill run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillReport {
    pub pages: usize,
    pub stored_new: usize,
    pub already_known: usize,
}

/// Walks thread history backward in bounded pages, upserting every message,
/// until it re-touches history the store already covers.
///
/// The walk is idempotent: every persist is an upsert, so re-running after
/// an interruption at any point re-walks already-covered ground without
/// duplicating anything. Callers that may retry a run (the supervisor)
/// snapshot the watermark once and pass it to [`Self::synchronize_from`] so
/// a restarted walk keeps going past its own partial writes.
pub struct BackfillSynchronizer {
    client: Arc<dyn PlatformClient>,
    store: Arc<dyn MessageStore>,
    thread_id: String,
    page_size: usize,
    retry: RetryPolicy,
}

impl BackfillSynchronizer {
    #[must_use]
    pub fn new(
        client: Arc<dyn PlatformClient>,
        store: Arc<dyn MessageStore>,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            thread_id: thread_id.into(),
            page_size: 200,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Synchronize against the store's current watermark.
    pub async fn synchronize(&self) -> Result<BackfillReport> {
        let watermark = self
            .store
            .latest_message_timestamp()
            .await
            .map_err(Error::Store)?;
        self.synchronize_from(watermark).await
    }

    /// Synchronize, stopping once a page reaches `watermark` (the newest
    /// timestamp known to be covered before this backfill epoch began).
    pub async fn synchronize_from(&self, watermark: Option<i64>) -> Result<BackfillReport> {
        let mut report = BackfillReport::default();
        let mut before = now_ms();

        loop {
            let mut page = retry_transient(self.retry, "fetch history page", || {
                self.client
                    .fetch_history(&self.thread_id, before, self.page_size)
            })
            .await?;
            report.pages += 1;

            // Oldest first, so a crash mid-page never leaves a newer message
            // persisted ahead of an older missing one within the page.
            page.sort_by(|a, b| (a.created_at_ms, &a.id).cmp(&(b.created_at_ms, &b.id)));

            for message in &page {
                let existed = self
                    .store
                    .upsert_message(message)
                    .await
                    .map_err(Error::Store)?;
                if existed {
                    report.already_known += 1;
                } else {
                    report.stored_new += 1;
                }
            }

            let Some(oldest) = page.first().map(|m| m.created_at_ms) else {
                debug!("empty history page, nothing left to fetch");
                break;
            };
            if page.len() <= 1 {
                debug!(oldest, "history exhausted");
                break;
            }
            if watermark.is_some_and(|w| oldest <= w) {
                debug!(oldest, watermark = ?watermark, "reached known history");
                break;
            }
            before = oldest;
        }

        info!(
            thread_id = %self.thread_id,
            pages = report.pages,
            stored_new = report.stored_new,
            already_known = report.already_known,
            "backfill complete"
        );
        Ok(report)
    }
}
