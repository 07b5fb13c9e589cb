//! Storage types for the storage abstraction layer.

use serde::{Deserialize, Serialize};
use shelfmark_core::{BookDraft, Category, new_record_id};
use time::OffsetDateTime;

/// A book as committed to a storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBook {
    /// The record ID assigned by the store.
    pub id: String,
    /// The unique key the record was deduplicated on.
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the record was committed.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl StoredBook {
    /// Creates a `StoredBook` from a draft, minting a fresh id and timestamp.
    #[must_use]
    pub fn from_draft(draft: &BookDraft) -> Self {
        Self {
            id: new_record_id(),
            isbn: draft.isbn.clone(),
            title: draft.title.clone(),
            author: draft.author.clone(),
            category: draft.category,
            published_year: draft.published_year,
            price: draft.price,
            description: draft.description.clone(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
