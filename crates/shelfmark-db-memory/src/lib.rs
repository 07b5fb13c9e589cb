//! # shelfmark-db-memory
//!
//! In-memory [`BookStore`](shelfmark_storage::BookStore) backend built on the
//! lock-free `papaya::HashMap`, keyed by ISBN.
//!
//! Transactions stage rows in a private buffer and publish them atomically on
//! commit under a commit lock; rollback (or simply dropping an uncommitted
//! transaction) leaves the committed map untouched.
//!
//! The backend also carries fault-injection switches
//! ([`InMemoryBookStore::fail_next_insert`] /
//! [`InMemoryBookStore::fail_next_commit`]) so integration tests can exercise
//! the all-or-nothing abort path of the ingestion pipeline.

mod storage;

pub use storage::InMemoryBookStore;
