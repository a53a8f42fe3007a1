use std::sync::Arc;

use libris_db::{decode, encode, Collection, DocumentStore, Filter, StoreError, Update};
use serde_json::{json, Value};

use super::models::{BorrowedRef, NewUserRecord, User};

const ID: &str = "User_id";
const EMAIL: &str = "Email";
const BORROWED: &str = "borrowed_books";

/// Typed access to the `Users` collection
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.find_one(&Filter::eq(ID, id)).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one(&Filter::eq(EMAIL, email)).await
    }

    pub(crate) async fn insert(&self, record: NewUserRecord) -> Result<User, StoreError> {
        let document = encode(Collection::Users, &record)?;
        let id = self.store.insert_one(Collection::Users, document).await?;
        Ok(User {
            id,
            name: record.name,
            email: record.email,
            borrowed: record.borrowed,
        })
    }

    /// Append a structured borrowed record unless one for the same book is
    /// already present, so retries never double-book.
    ///
    /// `false` means nothing was written: the user is gone or already holds the book.
    pub async fn push_borrowed(&self, user_id: i64, book_id: i64, title: &str) -> Result<bool, StoreError> {
        let reference = BorrowedRef {
            book_id: Some(book_id),
            title: title.to_string(),
        };
        self.store
            .update_one(
                Collection::Users,
                &Filter::eq(ID, user_id).and_lacks(BORROWED, json!({"Book_id": book_id})),
                Update::push(BORROWED, serde_json::to_value(reference)?),
            )
            .await
    }

    /// Borrowed list exactly as stored. `None` when the user does not exist.
    pub async fn raw_borrowed(&self, user_id: i64) -> Result<Option<Vec<Value>>, StoreError> {
        let Some(document) = self
            .store
            .find_one(Collection::Users, &Filter::eq(ID, user_id))
            .await?
        else {
            return Ok(None);
        };

        match document.get(BORROWED) {
            None => Ok(Some(Vec::new())),
            Some(Value::Array(items)) => Ok(Some(items.clone())),
            Some(other) => Err(StoreError::Corrupt {
                collection: Collection::Users,
                reason: format!("{BORROWED} of user {user_id} is not an array: {other}"),
            }),
        }
    }

    /// Replace the borrowed list, but only while it still equals `expected`.
    ///
    /// `false` means the list changed since it was read, or the user is gone.
    pub async fn swap_borrowed(
        &self,
        user_id: i64,
        expected: Vec<Value>,
        replacement: Vec<Value>,
    ) -> Result<bool, StoreError> {
        self.store
            .update_one(
                Collection::Users,
                &Filter::eq(ID, user_id).and_eq(BORROWED, Value::Array(expected)),
                Update::set(BORROWED, Value::Array(replacement)),
            )
            .await
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<User>, StoreError> {
        self.store
            .find_one(Collection::Users, filter)
            .await?
            .map(|document| decode(Collection::Users, document))
            .transpose()
    }
}
