use std::sync::Arc;

use libris_db::{decode, encode, Collection, DocumentStore, Filter, StoreError, Update};

use super::models::{Book, NewBookRecord};

const ID: &str = "Book_id";
const TITLE: &str = "Title";
const AVAILABLE: &str = "Available_copies";
const DESCRIPTION: &str = "Description";

/// Typed access to the `Books` collection
#[derive(Clone)]
pub struct BookRepository {
    store: Arc<dyn DocumentStore>,
}

impl BookRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find(&self, id: i64) -> Result<Option<Book>, StoreError> {
        self.find_one(&Filter::eq(ID, id)).await
    }

    /// Exact title match; the lowest id wins when titles repeat
    pub async fn find_by_title(&self, title: &str) -> Result<Option<Book>, StoreError> {
        self.find_one(&Filter::eq(TITLE, title)).await
    }

    pub async fn all(&self) -> Result<Vec<Book>, StoreError> {
        self.find_all(&Filter::all()).await
    }

    pub async fn available(&self) -> Result<Vec<Book>, StoreError> {
        self.find_all(&Filter::all().and_gt(AVAILABLE, 0)).await
    }

    pub(crate) async fn insert(&self, record: NewBookRecord) -> Result<Book, StoreError> {
        let document = encode(Collection::Books, &record)?;
        let id = self.store.insert_one(Collection::Books, document).await?;
        Ok(Book {
            id,
            title: record.title,
            authors: record.authors,
            genres: record.genres,
            total_copies: record.total_copies,
            available_copies: record.available_copies,
            description: None,
        })
    }

    pub async fn set_description(&self, id: i64, description: &str) -> Result<bool, StoreError> {
        self.store
            .update_one(
                Collection::Books,
                &Filter::eq(ID, id),
                Update::set(DESCRIPTION, description),
            )
            .await
    }

    /// Atomically take one copy off the shelf. `false` when none are left.
    pub async fn take_copy(&self, id: i64) -> Result<bool, StoreError> {
        self.store
            .update_one(
                Collection::Books,
                &Filter::eq(ID, id).and_gt(AVAILABLE, 0),
                Update::inc(AVAILABLE, -1),
            )
            .await
    }

    /// Atomically put one copy back. `false` when the shelf is already full.
    pub async fn restore_copy(&self, id: i64, total_copies: i64) -> Result<bool, StoreError> {
        self.store
            .update_one(
                Collection::Books,
                &Filter::eq(ID, id).and_lt(AVAILABLE, total_copies),
                Update::inc(AVAILABLE, 1),
            )
            .await
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Book>, StoreError> {
        self.store
            .find_one(Collection::Books, filter)
            .await?
            .map(|document| decode(Collection::Books, document))
            .transpose()
    }

    async fn find_all(&self, filter: &Filter) -> Result<Vec<Book>, StoreError> {
        self.store
            .find_all(Collection::Books, filter)
            .await?
            .into_iter()
            .map(|document| decode(Collection::Books, document))
            .collect()
    }
}
