//! The shared scheme document store.
//!
//! Writes are full-document replaces keyed by the deterministic id:
//! a record always reflects exactly one scrape's output, with no
//! stale-field bleed-through. Concurrent writes to distinct ids are
//! independent; same-id writes are last-writer-wins.

mod memory;
mod postgres;

pub use memory::MemorySchemeStore;
pub use postgres::PostgresSchemeStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{SchemeId, SchemeRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

#[async_trait]
pub trait SchemeStore: Send + Sync {
    /// Insert or fully overwrite the record keyed by `record.id`.
    async fn upsert(&self, record: &SchemeRecord) -> Result<(), StoreError>;

    async fn get(&self, id: &SchemeId) -> Result<Option<SchemeRecord>, StoreError>;

    /// Full read; local filtering is done client-side, no secondary
    /// indices assumed.
    async fn list_all(&self) -> Result<Vec<SchemeRecord>, StoreError>;

    /// Number of documents whose source is `url`. Stays at one across
    /// re-scrapes of the same page.
    async fn count_for_url(&self, url: &str) -> Result<u64, StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
