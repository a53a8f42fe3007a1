//! Document store interface for libris.
//!
//! Collections hold schemaless JSON documents keyed by an integer id field.
//! Every [`Update`] applied through [`DocumentStore::update_one`] is checked
//! against its [`Filter`] and applied under the same lock, so conditional
//! updates such as "decrement only if > 0" are atomic.

pub mod document;
pub mod memory;
pub mod module;

pub use document::{decode, encode, Collection, Document, Filter, Update};
pub use memory::MemoryStore;
pub use module::StoreModule;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corrupt document in {collection}: {reason}")]
    Corrupt {
        collection: Collection,
        reason: String,
    },

    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Operations the domain layer needs from a document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First document matching `filter`, in id order
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Every document matching `filter`, in id order
    async fn find_all(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError>;

    /// Insert `document`, writing a freshly assigned id into the collection's id field
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<i64, StoreError>;

    /// Apply `update` to the first document matching `filter`.
    /// Returns `false` when nothing matched.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<bool, StoreError>;
}
