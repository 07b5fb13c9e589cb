//! # shelfmark-ingest
//!
//! Bulk ingestion pipeline for the Shelfmark catalog core.
//!
//! [`BatchIngestionPipeline`] runs one batch of candidate books through
//! validation, duplicate filtering, a single all-or-nothing transactional
//! insert, and category-targeted cache invalidation, producing one
//! consolidated, order-preserving [`BatchResult`].
//!
//! ## Phases
//!
//! Strictly sequential: validate → dedupe → insert → invalidate → map.
//! Validation and result mapping fan out to a bounded worker pool when the
//! batch reaches [`IngestOptions::parallel_threshold`]; each validation
//! worker mints its own [`ValidationSession`](shelfmark_storage::ValidationSession),
//! never sharing a handle across concurrent units.
//!
//! ## Failure semantics
//!
//! Per-item validation and duplicate-key failures are collected into
//! [`BatchResult::errors`] and never abort the batch. Store failures abort
//! the whole call with [`IngestError::Storage`] after a guaranteed rollback;
//! no `BatchResult` ever claims partial success for an aborted call.
//! Precondition violations (empty or oversized batch) are rejected before
//! any store or cache interaction.

mod batch;
mod error;
mod pipeline;

pub use batch::{BatchItemError, BatchResult, BookDto, IngestOptions};
pub use error::IngestError;
pub use pipeline::BatchIngestionPipeline;
