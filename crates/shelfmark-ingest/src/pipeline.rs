//! The batch ingestion pipeline.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use shelfmark_cache::CacheKeyRegistry;
use shelfmark_core::{BookDraft, Category, new_operation_id};
use shelfmark_storage::{BookStore, StoredBook, ValidationGateway};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::{BatchItem, BatchItemError, BatchResult, BookDto, IngestOptions};
use crate::error::IngestError;

/// Reported reason for items filtered out by duplicate-key detection.
const DUPLICATE_REASON: &str = "already exists";

/// Orchestrates one batch of candidate books through validation, duplicate
/// filtering, an atomic store commit, and cache invalidation.
///
/// The pipeline is cheap to construct and internally immutable; callers
/// typically build one per store/registry pair at startup and share it.
pub struct BatchIngestionPipeline {
    store: Arc<dyn BookStore>,
    validator: Arc<dyn ValidationGateway>,
    registry: Arc<CacheKeyRegistry>,
    options: IngestOptions,
}

impl std::fmt::Debug for BatchIngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchIngestionPipeline")
            .field("backend", &self.store.backend_name())
            .field("options", &self.options)
            .finish()
    }
}

impl BatchIngestionPipeline {
    pub fn new(
        store: Arc<dyn BookStore>,
        validator: Arc<dyn ValidationGateway>,
        registry: Arc<CacheKeyRegistry>,
        options: IngestOptions,
    ) -> Self {
        Self {
            store,
            validator,
            registry,
            options,
        }
    }

    /// The options this pipeline was built with.
    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Runs a batch through the pipeline. Blocks (asynchronously) until the
    /// full [`BatchResult`] or a fatal error is ready.
    pub async fn ingest(&self, drafts: Vec<BookDraft>) -> Result<BatchResult, IngestError> {
        self.ingest_with_cancel(drafts, CancellationToken::new())
            .await
    }

    /// Like [`ingest`](Self::ingest), but observes `cancel` during the
    /// validation phase so a disconnected caller does not hold worker-pool
    /// capacity. An open transaction is never abandoned by cancellation;
    /// once the insert phase starts the batch runs to commit or rollback.
    pub async fn ingest_with_cancel(
        &self,
        drafts: Vec<BookDraft>,
        cancel: CancellationToken,
    ) -> Result<BatchResult, IngestError> {
        let started = Instant::now();
        let operation_id = new_operation_id();
        let total = drafts.len();

        // Precondition gate: rejected before any store or cache interaction.
        if total == 0 {
            return Err(IngestError::EmptyBatch);
        }
        if total > self.options.max_batch_size {
            return Err(IngestError::BatchTooLarge {
                size: total,
                max: self.options.max_batch_size,
            });
        }

        debug!(
            operation_id = %operation_id,
            total,
            parallel = (total >= self.options.parallel_threshold),
            "starting batch ingest"
        );

        // Phase 1: validate, keeping every item pinned to its original index.
        let items = if total >= self.options.parallel_threshold {
            self.validate_parallel(&drafts, &cancel).await?
        } else {
            self.validate_sequential(&drafts, &cancel).await?
        };

        let mut errors: Vec<BatchItemError> = items
            .iter()
            .filter(|item| !item.errors.is_empty())
            .map(|item| BatchItemError {
                index: item.index,
                title: item.draft.title.clone(),
                isbn: item.draft.isbn.clone(),
                validation_errors: item.errors.clone(),
            })
            .collect();
        let valid: Vec<&BatchItem> = items.iter().filter(|item| item.errors.is_empty()).collect();

        // Phase 2: short-circuit when nothing passed; no store write, no
        // invalidation.
        if valid.is_empty() {
            info!(operation_id = %operation_id, total, "batch rejected: no items passed validation");
            errors.sort_by_key(|e| e.index);
            return Ok(BatchResult {
                total_requested: total,
                successfully_created: 0,
                failed: total,
                created_items: Vec::new(),
                errors,
                processing_time_ms: started.elapsed().as_millis() as u64,
                operation_id,
            });
        }

        // Phase 3: one bulk duplicate-key query; duplicates become error
        // entries without re-opening validation. Within-batch repeats count
        // as duplicates of the first occurrence.
        let isbns: Vec<String> = valid.iter().map(|item| item.draft.isbn.clone()).collect();
        let existing = self.store.existing_isbns(&isbns).await?;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut insert_set: Vec<&BatchItem> = Vec::with_capacity(valid.len());
        for item in &valid {
            if existing.contains(&item.draft.isbn) || !seen.insert(item.draft.isbn.as_str()) {
                errors.push(BatchItemError {
                    index: item.index,
                    title: item.draft.title.clone(),
                    isbn: item.draft.isbn.clone(),
                    validation_errors: vec![DUPLICATE_REASON.to_string()],
                });
            } else {
                insert_set.push(item);
            }
        }

        // Phase 4: one transaction, one batched write, all-or-nothing.
        let created = if insert_set.is_empty() {
            Vec::new()
        } else {
            let insert_drafts: Vec<BookDraft> =
                insert_set.iter().map(|item| item.draft.clone()).collect();
            self.insert_transactional(&insert_drafts, &operation_id)
                .await?
        };

        // Phase 5: targeted invalidation, once per distinct category.
        // Never reverts the already-committed transaction; staleness left
        // behind by a missed key is bounded by the cache TTLs.
        for category in distinct_categories(&created) {
            let removed = self.registry.invalidate_category(category);
            debug!(
                operation_id = %operation_id,
                category = %category,
                removed,
                "invalidated category after commit"
            );
        }

        // Phase 6: map to result DTOs and assemble in submission order.
        let created_items = self.map_dtos(&created).await?;
        errors.sort_by_key(|e| e.index);

        let result = BatchResult {
            total_requested: total,
            successfully_created: created_items.len(),
            failed: errors.len(),
            created_items,
            errors,
            processing_time_ms: started.elapsed().as_millis() as u64,
            operation_id,
        };
        info!(
            operation_id = %result.operation_id,
            total = result.total_requested,
            created = result.successfully_created,
            failed = result.failed,
            elapsed_ms = result.processing_time_ms,
            "batch ingest complete"
        );
        Ok(result)
    }

    /// Sequential validation below the parallel threshold: one session for
    /// the whole batch, cancellation checked between items.
    async fn validate_sequential(
        &self,
        drafts: &[BookDraft],
        cancel: &CancellationToken,
    ) -> Result<Vec<BatchItem>, IngestError> {
        let mut session = self.validator.session();
        let mut items = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(IngestError::Cancelled);
            }
            let errors = session.validate(draft).await;
            items.push(BatchItem {
                index,
                draft: draft.clone(),
                errors,
            });
        }
        Ok(items)
    }

    /// Parallel validation: a worker pool bounded by the effective worker
    /// count, one freshly minted session per unit of work. Results arrive in
    /// completion order and are re-sorted by submission index.
    async fn validate_parallel(
        &self,
        drafts: &[BookDraft],
        cancel: &CancellationToken,
    ) -> Result<Vec<BatchItem>, IngestError> {
        let semaphore = Arc::new(Semaphore::new(self.options.effective_workers()));
        let mut join_set = JoinSet::new();

        for (index, draft) in drafts.iter().cloned().enumerate() {
            let gateway = Arc::clone(&self.validator);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            join_set.spawn(async move {
                let permit = tokio::select! {
                    // Cancellation wins over an available permit.
                    biased;
                    _ = cancel.cancelled() => return None,
                    permit = semaphore.acquire_owned() => permit,
                };
                // The semaphore is never closed while workers are running.
                let _permit = permit.ok()?;
                let mut session = gateway.session();
                Some((index, session.validate(&draft).await))
            });
        }

        let mut outcomes: Vec<(usize, Vec<String>)> = Vec::with_capacity(drafts.len());
        while let Some(joined) = join_set.join_next().await {
            let outcome = joined
                .map_err(|e| IngestError::internal(format!("validation worker failed: {e}")))?;
            match outcome {
                Some(pair) => outcomes.push(pair),
                // Dropping the JoinSet on this exit path aborts the
                // remaining workers and releases pool capacity.
                None => return Err(IngestError::Cancelled),
            }
        }

        outcomes.sort_by_key(|(index, _)| *index);
        Ok(outcomes
            .into_iter()
            .map(|(index, errors)| BatchItem {
                index,
                draft: drafts[index].clone(),
                errors,
            })
            .collect())
    }

    /// Begins one transaction, performs the single batched write, and
    /// commits. Rollback is guaranteed on the insert-failure path; the
    /// `Transaction` contract guarantees a failed commit publishes nothing.
    async fn insert_transactional(
        &self,
        drafts: &[BookDraft],
        operation_id: &str,
    ) -> Result<Vec<StoredBook>, IngestError> {
        let mut tx = self.store.begin_transaction().await?;
        let created = match tx.insert_many(drafts).await {
            Ok(created) => created,
            Err(err) => {
                warn!(
                    operation_id = %operation_id,
                    error = %err,
                    "batched insert failed, rolling back"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(
                        operation_id = %operation_id,
                        error = %rollback_err,
                        "rollback after failed insert also failed"
                    );
                }
                return Err(err.into());
            }
        };
        tx.commit().await?;
        Ok(created)
    }

    /// Maps committed rows to result DTOs, in parallel above the same
    /// threshold used for validation.
    async fn map_dtos(&self, created: &[StoredBook]) -> Result<Vec<BookDto>, IngestError> {
        if created.len() < self.options.parallel_threshold {
            return Ok(created.iter().map(BookDto::from).collect());
        }

        let semaphore = Arc::new(Semaphore::new(self.options.effective_workers()));
        let mut join_set = JoinSet::new();
        for (index, stored) in created.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, BookDto::from(&stored))
            });
        }

        let mut dtos: Vec<(usize, BookDto)> = Vec::with_capacity(created.len());
        while let Some(joined) = join_set.join_next().await {
            let pair =
                joined.map_err(|e| IngestError::internal(format!("mapping worker failed: {e}")))?;
            dtos.push(pair);
        }

        // Mapping workers also finish out of order; insertion order is the
        // contract for created_items.
        dtos.sort_by_key(|(index, _)| *index);
        Ok(dtos.into_iter().map(|(_, dto)| dto).collect())
    }
}

/// Distinct categories of the committed rows, first-seen order.
fn distinct_categories(created: &[StoredBook]) -> Vec<Category> {
    let mut categories = Vec::new();
    for book in created {
        if !categories.contains(&book.category) {
            categories.push(book.category);
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfmark_storage::StoredBook;

    fn stored(isbn: &str, category: Category) -> StoredBook {
        StoredBook::from_draft(&BookDraft::new("T", "A", isbn, category))
    }

    #[test]
    fn test_distinct_categories_preserves_first_seen_order() {
        let created = vec![
            stored("1", Category::Science),
            stored("2", Category::Fiction),
            stored("3", Category::Science),
            stored("4", Category::Fiction),
        ];
        assert_eq!(
            distinct_categories(&created),
            vec![Category::Science, Category::Fiction]
        );
    }

    #[test]
    fn test_distinct_categories_empty() {
        assert!(distinct_categories(&[]).is_empty());
    }
}
