//! Storage and validation traits for the storage abstraction layer.
//!
//! This module defines the core traits that storage backends and validation
//! collaborators must implement.

use std::collections::HashSet;

use async_trait::async_trait;
use shelfmark_core::BookDraft;

use crate::error::StorageError;
use crate::types::StoredBook;

/// The main storage trait that all book store backends must implement.
///
/// This trait defines the contract for duplicate-key detection and
/// transaction support. Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use shelfmark_storage::{BookStore, StorageError};
///
/// async fn has_any(store: &dyn BookStore, isbns: &[String]) -> Result<bool, StorageError> {
///     Ok(!store.existing_isbns(isbns).await?.is_empty())
/// }
/// ```
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Returns the subset of `isbns` that already exist in the store.
    ///
    /// This is a single bulk query; callers use it to filter duplicates out
    /// of a candidate set before inserting.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for absent keys.
    async fn existing_isbns(&self, isbns: &[String]) -> Result<HashSet<String>, StorageError>;

    /// Begins a new transaction.
    ///
    /// Returns a [`Transaction`] object that can be used to perform batched
    /// inserts atomically. The transaction must be either committed or rolled
    /// back; dropping it uncommitted must leave the store unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if transactions are not
    /// supported or cannot be started.
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, StorageError>;

    /// Returns whether this storage backend supports transactions.
    fn supports_transactions(&self) -> bool;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// A transaction for performing atomic batched inserts.
///
/// Operations within a transaction are invisible to other operations until
/// the transaction is committed. If an error occurs or `rollback` is called,
/// all operations are undone.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Inserts a batch of drafts in one write.
    ///
    /// All rows are staged together; either every draft becomes visible on
    /// commit or none do.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` when a draft's ISBN collides
    /// with a committed row or another staged row.
    async fn insert_many(&mut self, drafts: &[BookDraft]) -> Result<Vec<StoredBook>, StorageError>;

    /// Commits all operations in this transaction.
    ///
    /// After commit, the transaction is consumed and cannot be used again.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if the commit fails. A failed
    /// commit leaves the store unchanged.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Rolls back all operations in this transaction.
    ///
    /// After rollback, the transaction is consumed and cannot be used again.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if the rollback fails.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}

/// Validation seam consumed by the ingestion pipeline.
///
/// The gateway itself is shared; each concurrent worker mints its own
/// [`ValidationSession`] through [`ValidationGateway::session`] and keeps it
/// for the duration of its work.
pub trait ValidationGateway: Send + Sync {
    /// Creates a validation session for exclusive use by one worker.
    fn session(&self) -> Box<dyn ValidationSession>;
}

/// A per-worker validation handle.
///
/// Sessions are `Send` but deliberately not `Sync`, and validation takes
/// `&mut self`: a single session can move to a worker task but can never be
/// used by two concurrently running units.
#[async_trait]
pub trait ValidationSession: Send {
    /// Validates one candidate record, returning field-level error messages.
    ///
    /// An empty vector means the draft passed. Validation never aborts a
    /// batch; failures are collected per item.
    async fn validate(&mut self, draft: &BookDraft) -> Vec<String>;
}
