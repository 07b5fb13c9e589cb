//! Batch DTOs and pipeline options.

use serde::{Deserialize, Serialize};
use shelfmark_core::{BookDraft, Category};
use shelfmark_storage::StoredBook;
use time::OffsetDateTime;

/// Default upper bound on items per `ingest` call.
const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Default batch size at which validation and mapping go parallel.
const DEFAULT_PARALLEL_THRESHOLD: usize = 10;

/// Tuning options for [`BatchIngestionPipeline`](crate::BatchIngestionPipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Maximum accepted batch size; larger batches are rejected outright.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Batch size at which validation and DTO mapping switch from
    /// sequential to worker-pool execution.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    /// Worker pool bound. `None` means the number of available processors.
    #[serde(default)]
    pub workers: Option<usize>,
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            workers: None,
        }
    }
}

impl IngestOptions {
    /// Sets the maximum batch size.
    #[must_use]
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    /// Sets the parallel threshold.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Pins the worker pool size instead of using available parallelism.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Effective worker pool bound.
    pub(crate) fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

/// One candidate record flowing through the pipeline, pinned to its original
/// submission index so the final result can be reconstructed in order.
#[derive(Debug, Clone)]
pub(crate) struct BatchItem {
    pub index: usize,
    pub draft: BookDraft,
    /// Field errors from validation; empty means the item passed.
    pub errors: Vec<String>,
}

/// A per-item failure entry, reported inline in [`BatchResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemError {
    /// Original submission index of the failed item.
    pub index: usize,
    pub title: String,
    pub isbn: String,
    /// Field errors, or a single "already exists" entry for duplicates.
    pub validation_errors: Vec<String>,
}

/// Result DTO for one committed book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDto {
    pub id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: Category,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&StoredBook> for BookDto {
    fn from(stored: &StoredBook) -> Self {
        Self {
            id: stored.id.clone(),
            title: stored.title.clone(),
            author: stored.author.clone(),
            isbn: stored.isbn.clone(),
            category: stored.category,
            created_at: stored.created_at,
        }
    }
}

/// Consolidated outcome of one `ingest` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub total_requested: usize,
    pub successfully_created: usize,
    pub failed: usize,
    /// Committed items, in insertion order.
    pub created_items: Vec<BookDto>,
    /// Per-item failures, sorted ascending by original index.
    pub errors: Vec<BatchItemError>,
    /// End-to-end wall time for the call.
    pub processing_time_ms: u64,
    /// Correlation token for tracing; never a business key.
    pub operation_id: String,
}
