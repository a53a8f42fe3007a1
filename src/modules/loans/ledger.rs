use serde_json::Value;

use crate::error::LibraryError;
use crate::modules::books::models::Book;
use crate::modules::books::repository::BookRepository;
use crate::modules::users::models::{BorrowedEntry, BorrowedRef, User};
use crate::modules::users::repository::UserRepository;

use super::normalize::{holds, normalize, resolve, CatalogIndex};

/// Borrow and return bookkeeping.
///
/// Copy counts only change through conditional store updates, so two readers
/// racing for the last copy cannot both win. A user holds at most one copy of
/// a given book.
pub struct Ledger {
    books: BookRepository,
    users: UserRepository,
}

impl Ledger {
    pub fn new(books: BookRepository, users: UserRepository) -> Self {
        Self { books, users }
    }

    /// The user's borrowed list in canonical form
    pub async fn borrowed(&self, user_id: i64) -> Result<Vec<BorrowedRef>, LibraryError> {
        let user = self.user(user_id).await?;
        self.normalized(&user).await
    }

    /// Take one copy of `book_id` for `user_id` and return its title
    pub async fn borrow(&self, user_id: i64, book_id: i64) -> Result<String, LibraryError> {
        let book = self.book(book_id).await?;
        let user = self.user(user_id).await?;

        if holds(&self.normalized(&user).await?, book_id) {
            return Err(LibraryError::AlreadyBorrowed {
                book_id,
                title: book.title,
            });
        }

        if !self.books.take_copy(book_id).await? {
            return Err(LibraryError::Unavailable {
                book_id,
                title: book.title,
            });
        }

        if let Err(err) = self.record_borrow(user_id, &book).await {
            match self.books.restore_copy(book_id, book.total_copies).await {
                Ok(_) => tracing::warn!(user_id, book_id, error = %err, "borrow rolled back"),
                Err(rollback) => tracing::error!(
                    user_id,
                    book_id,
                    error = %err,
                    rollback_error = %rollback,
                    "borrow rollback failed; copy count is one short"
                ),
            }
            return Err(err);
        }

        tracing::info!(user_id, book_id, title = %book.title, "book borrowed");
        Ok(book.title)
    }

    /// Give back `book_id` for `user_id` and return its title.
    ///
    /// Every stored entry that normalizes to `book_id` is removed, whatever
    /// its stored shape, and one copy goes back on the shelf.
    pub async fn return_book(&self, user_id: i64, book_id: i64) -> Result<String, LibraryError> {
        let book = self.book(book_id).await?;
        let index = CatalogIndex::from_books(&self.books.all().await?);

        // Records go first so a repeated return sees NotBorrowed instead of
        // restoring a second copy.
        loop {
            let stored = self
                .users
                .raw_borrowed(user_id)
                .await?
                .ok_or_else(|| LibraryError::user_not_found(user_id))?;

            let kept: Vec<Value> = stored
                .iter()
                .filter(|value| {
                    resolve(&BorrowedEntry::from((*value).clone()), &index).book_id != Some(book_id)
                })
                .cloned()
                .collect();
            if kept.len() == stored.len() {
                return Err(LibraryError::NotBorrowed { book_id });
            }

            if self.users.swap_borrowed(user_id, stored, kept).await? {
                break;
            }
            // Another write to the list landed between read and swap.
            tracing::debug!(user_id, book_id, "borrowed list changed during return; retrying");
        }

        if !self.books.restore_copy(book_id, book.total_copies).await? {
            tracing::warn!(
                user_id,
                book_id,
                "all copies already on the shelf; legacy record cleared without restocking"
            );
        }

        tracing::info!(user_id, book_id, title = %book.title, "book returned");
        Ok(book.title)
    }

    /// Append the borrowed record, retrying once after a store error. The
    /// append is keyed by book id, so a retry after a lost acknowledgement
    /// is a no-op.
    async fn record_borrow(&self, user_id: i64, book: &Book) -> Result<(), LibraryError> {
        match self.users.push_borrowed(user_id, book.id, &book.title).await {
            Ok(true) => return Ok(()),
            // The guard fired on a first attempt: a concurrent borrow of the
            // same book by this reader got there first.
            Ok(false) => return Err(self.refused_append(user_id, book).await),
            Err(err) => {
                tracing::warn!(user_id, book_id = book.id, error = %err, "retrying borrowed-list append");
            }
        }

        if self
            .users
            .push_borrowed(user_id, book.id, &book.title)
            .await?
        {
            return Ok(());
        }
        // Nothing written on retry: either the first attempt landed or the user vanished.
        match self.users.find(user_id).await? {
            Some(_) => Ok(()),
            None => Err(LibraryError::user_not_found(user_id)),
        }
    }

    async fn refused_append(&self, user_id: i64, book: &Book) -> LibraryError {
        match self.users.find(user_id).await {
            Ok(Some(_)) => LibraryError::AlreadyBorrowed {
                book_id: book.id,
                title: book.title.clone(),
            },
            Ok(None) => LibraryError::user_not_found(user_id),
            Err(err) => err.into(),
        }
    }

    async fn normalized(&self, user: &User) -> Result<Vec<BorrowedRef>, LibraryError> {
        let catalog = self.books.all().await?;
        Ok(normalize(&user.borrowed, &CatalogIndex::from_books(&catalog)))
    }

    async fn book(&self, book_id: i64) -> Result<Book, LibraryError> {
        self.books
            .find(book_id)
            .await?
            .ok_or_else(|| LibraryError::book_not_found(book_id))
    }

    async fn user(&self, user_id: i64) -> Result<User, LibraryError> {
        self.users
            .find(user_id)
            .await?
            .ok_or_else(|| LibraryError::user_not_found(user_id))
    }
}
