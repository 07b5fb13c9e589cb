//! # shelfmark-storage
//!
//! Storage abstraction layer for the Shelfmark ingestion core.
//!
//! This crate defines the traits and types that storage backends and
//! validation collaborators must implement. It does not contain any
//! implementations - those are provided by separate crates.
//!
//! ## Overview
//!
//! The main trait is [`BookStore`], which defines the contract for:
//! - Duplicate-key detection over unique ISBNs
//! - Transactions with all-or-nothing batched inserts
//!
//! [`ValidationGateway`] is the seam for per-record validation. It mints
//! [`ValidationSession`] handles, one per concurrent worker; a session is
//! `Send` but not `Sync` and validates through `&mut self`, so a single
//! handle can never be shared across concurrently running units.
//!
//! ## Example
//!
//! ```ignore
//! use shelfmark_storage::{BookStore, StorageError};
//!
//! async fn commit_batch(
//!     store: &dyn BookStore,
//!     drafts: &[BookDraft],
//! ) -> Result<Vec<StoredBook>, StorageError> {
//!     let mut tx = store.begin_transaction().await?;
//!     let created = tx.insert_many(drafts).await?;
//!     tx.commit().await?;
//!     Ok(created)
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{BookStore, Transaction, ValidationGateway, ValidationSession};
pub use types::StoredBook;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared storage trait object.
pub type DynStore = std::sync::Arc<dyn BookStore>;
