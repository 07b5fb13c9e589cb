//! Error types for the ingestion pipeline.

use shelfmark_storage::StorageError;

/// Fatal errors for a whole `ingest` call.
///
/// Per-item validation and duplicate-key failures are not errors at this
/// level; they are reported inline in the returned
/// [`BatchResult`](crate::BatchResult). A caller can always distinguish
/// "some items were rejected" (an `Ok` result with `failed > 0`) from "the
/// whole operation did not happen" (one of these).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The batch contained no items. Rejected before any side effect.
    #[error("Batch is empty")]
    EmptyBatch,

    /// The batch exceeded the configured maximum. Rejected before any side
    /// effect.
    #[error("Batch of {size} items exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Number of items submitted.
        size: usize,
        /// Configured `max_batch_size`.
        max: usize,
    },

    /// The caller's cancellation token fired during validation. No store
    /// write happened.
    #[error("Ingestion cancelled")]
    Cancelled,

    /// A store query, insert, or commit failed. The transaction, if one was
    /// open, has been rolled back; nothing from the batch was committed.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    /// A worker task failed to complete (panic or runtime shutdown).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl IngestError {
    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` for precondition rejections, which are guaranteed to
    /// have performed no side effects.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::EmptyBatch | Self::BatchTooLarge { .. })
    }

    /// Returns `true` if the call was aborted by a storage failure.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
