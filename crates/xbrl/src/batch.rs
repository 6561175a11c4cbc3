//! Concurrent batch driver.

use std::num::NonZeroUsize;
use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use xbrl_core::{FactStore, NormalizeError, Result};

use crate::filing::Filing;
use crate::pipeline::{Outcome, Pipeline};

/// Concurrency and time limits for a batch run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of filings in flight.
    pub concurrency: usize,
    /// Per-filing time limit. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism().map_or(4, NonZeroUsize::get),
            timeout: None,
        }
    }
}

impl BatchOptions {
    /// Sets the concurrency limit.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the per-filing time limit.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A filing that was not published.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchIssue {
    /// Document identifier.
    pub doc_id: String,
    /// Skip reason or error message.
    pub reason: String,
}

/// Summary of a batch run.
///
/// Lists are in completion order, not input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Documents whose fact sets were stored.
    pub processed: Vec<String>,
    /// Documents lacking identifiers.
    pub skipped: Vec<BatchIssue>,
    /// Documents that timed out, panicked or could not be stored.
    pub failed: Vec<BatchIssue>,
}

impl BatchReport {
    /// Returns the number of documents accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len() + self.failed.len()
    }
}

impl Pipeline {
    /// Processes filings concurrently and stores every resulting fact set.
    ///
    /// Each filing runs on a blocking worker. Skipped and failed filings are
    /// recorded in the report and the batch continues. A filing that exceeds
    /// the time limit is reported as failed; its worker is not interrupted
    /// and its result is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::InvalidParameter`] if the concurrency limit
    /// is zero.
    pub async fn run_batch(
        &self,
        filings: Vec<Filing>,
        store: &dyn FactStore,
        options: BatchOptions,
    ) -> Result<BatchReport> {
        self.run_batch_with(filings, store, options, |pipeline, filing| {
            pipeline.process(filing)
        })
        .await
    }

    async fn run_batch_with<W>(
        &self,
        filings: Vec<Filing>,
        store: &dyn FactStore,
        options: BatchOptions,
        work: W,
    ) -> Result<BatchReport>
    where
        W: Fn(&Self, &Filing) -> Outcome + Clone + Send + 'static,
    {
        if options.concurrency == 0 {
            return Err(NormalizeError::InvalidParameter(
                "batch concurrency must be at least 1".to_string(),
            ));
        }
        info!(
            filings = filings.len(),
            concurrency = options.concurrency,
            store = store.name(),
            "Starting batch"
        );

        let mut results = futures::stream::iter(filings.into_iter().map(|filing| {
            let pipeline = self.clone();
            let work = work.clone();
            async move {
                let doc_id = filing.doc_id().to_string();
                let task = tokio::task::spawn_blocking(move || work(&pipeline, &filing));
                let result = join_within(task, options.timeout, &doc_id).await;
                (doc_id, result)
            }
        }))
        .buffer_unordered(options.concurrency);

        let mut report = BatchReport::default();
        while let Some((doc_id, result)) = results.next().await {
            match result {
                Ok(Outcome::Processed(facts)) => match store.put(&facts).await {
                    Ok(()) => {
                        debug!(doc_id = %doc_id, "Stored fact set");
                        report.processed.push(doc_id);
                    }
                    Err(e) => {
                        warn!(doc_id = %doc_id, error = %e, "Failed to store fact set");
                        report.failed.push(BatchIssue {
                            doc_id,
                            reason: e.to_string(),
                        });
                    }
                },
                Ok(Outcome::Skipped { doc_id, reason }) => {
                    report.skipped.push(BatchIssue { doc_id, reason });
                }
                Err(e) => {
                    warn!(doc_id = %doc_id, error = %e, "Filing failed");
                    report.failed.push(BatchIssue {
                        doc_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.processed.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Batch complete"
        );
        Ok(report)
    }
}

async fn join_within<T>(
    task: JoinHandle<T>,
    timeout: Option<Duration>,
    doc_id: &str,
) -> Result<T> {
    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| NormalizeError::Timeout {
                doc_id: doc_id.to_string(),
                elapsed: limit,
            })?,
        None => task.await,
    };
    joined.map_err(|e| NormalizeError::Task(e.to_string()))
}
