use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use shelfmark_core::BookDraft;
use shelfmark_storage::{BookStore, StorageError, StoredBook, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

/// Fault-injection switches shared between a store and its transactions.
#[derive(Debug, Default)]
struct FaultFlags {
    next_insert: AtomicBool,
    next_commit: AtomicBool,
}

/// In-memory book store backend using a papaya lock-free HashMap.
///
/// The committed map is keyed by ISBN, which makes duplicate-key detection a
/// plain lookup. Writes go through [`MemoryTransaction`]; nothing becomes
/// visible to readers before commit.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    /// Committed rows, keyed by ISBN.
    data: Arc<PapayaHashMap<String, StoredBook>>,
    /// Serializes commits so the conflict re-check and the publish step are
    /// atomic with respect to other transactions.
    commit_lock: Arc<Mutex<()>>,
    faults: Arc<FaultFlags>,
}

impl InMemoryBookStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed rows.
    pub fn count(&self) -> usize {
        self.data.pin().len()
    }

    /// Reads a committed row by ISBN.
    pub fn get(&self, isbn: &str) -> Option<StoredBook> {
        self.data.pin().get(isbn).cloned()
    }

    /// Seeds a committed row directly, bypassing transactions. Test helper.
    pub fn seed(&self, book: StoredBook) {
        self.data.pin().insert(book.isbn.clone(), book);
    }

    /// Drops every committed row.
    pub fn clear(&self) {
        self.data.pin().clear();
    }

    /// Makes the next `insert_many` on any transaction fail.
    pub fn fail_next_insert(&self) {
        self.faults.next_insert.store(true, Ordering::SeqCst);
    }

    /// Makes the next `commit` on any transaction fail.
    pub fn fail_next_commit(&self) {
        self.faults.next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn existing_isbns(&self, isbns: &[String]) -> Result<HashSet<String>, StorageError> {
        let guard = self.data.pin();
        Ok(isbns
            .iter()
            .filter(|isbn| guard.contains_key(isbn.as_str()))
            .cloned()
            .collect())
    }

    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, StorageError> {
        Ok(Box::new(MemoryTransaction {
            data: Arc::clone(&self.data),
            commit_lock: Arc::clone(&self.commit_lock),
            faults: Arc::clone(&self.faults),
            staged: Vec::new(),
        }))
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory-papaya"
    }
}

/// A buffering transaction over [`InMemoryBookStore`].
///
/// Staged rows live only in this struct until commit; dropping the
/// transaction discards them, which is what guarantees rollback on every
/// exit path.
struct MemoryTransaction {
    data: Arc<PapayaHashMap<String, StoredBook>>,
    commit_lock: Arc<Mutex<()>>,
    faults: Arc<FaultFlags>,
    staged: Vec<StoredBook>,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn insert_many(&mut self, drafts: &[BookDraft]) -> Result<Vec<StoredBook>, StorageError> {
        if self.faults.next_insert.swap(false, Ordering::SeqCst) {
            return Err(StorageError::transaction_error(
                "injected insert failure".to_string(),
            ));
        }

        let guard = self.data.pin();
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let collides_committed = guard.contains_key(draft.isbn.as_str());
            let collides_staged = self.staged.iter().any(|s| s.isbn == draft.isbn);
            if collides_committed || collides_staged {
                return Err(StorageError::already_exists(draft.isbn.clone()));
            }
            created.push(StoredBook::from_draft(draft));
        }

        self.staged.extend(created.iter().cloned());
        Ok(created)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        if self.faults.next_commit.swap(false, Ordering::SeqCst) {
            return Err(StorageError::transaction_error(
                "injected commit failure".to_string(),
            ));
        }

        let staged = std::mem::take(&mut self.staged);
        let _commit_guard = self.commit_lock.lock().await;
        let guard = self.data.pin();

        // Re-check under the commit lock: another transaction may have
        // committed a colliding ISBN since insert_many staged these rows.
        // Nothing is published unless every staged row is still clear.
        for row in &staged {
            if guard.contains_key(row.isbn.as_str()) {
                return Err(StorageError::transaction_error(format!(
                    "commit conflict on ISBN {}",
                    row.isbn
                )));
            }
        }

        let count = staged.len();
        for row in staged {
            guard.insert(row.isbn.clone(), row);
        }
        debug!(rows = count, "memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        debug!(rows = self.staged.len(), "memory transaction rolled back");
        // Staged rows were never published; dropping self is the rollback.
        Ok(())
    }
}
