use serde_json::Value;

use super::models::{Account, BorrowedEntry, NewUserRecord, Profile, SignUp, User};
use super::repository::UserRepository;
use crate::error::LibraryError;
use crate::modules::books::models::Book;
use crate::modules::books::repository::BookRepository;
use crate::modules::loans::normalize::{normalize, CatalogIndex};
use crate::utils::parse_integer;

/// Sign-up, sign-in and the reader's own views
pub struct Accounts {
    users: UserRepository,
    books: BookRepository,
}

impl Accounts {
    pub fn new(users: UserRepository, books: BookRepository) -> Self {
        Self { users, books }
    }

    pub async fn sign_up(&self, request: SignUp) -> Result<User, LibraryError> {
        let name = request.username.trim().to_string();
        if name.is_empty() {
            return Err(LibraryError::invalid("username", "is required"));
        }
        let email = request.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(LibraryError::invalid("email", "must be an email address"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(LibraryError::DuplicateEmail(email));
        }

        let user = self
            .users
            .insert(NewUserRecord {
                name,
                email,
                borrowed: Vec::new(),
            })
            .await?;

        tracing::info!(user_id = user.id, "user signed up");
        Ok(user)
    }

    /// Resolve the id a reader signs in with. Accepts a number or numeric text.
    pub async fn log_in(&self, user_id: &Value) -> Result<User, LibraryError> {
        let id = parse_integer("user_id", user_id)?;
        self.user(id).await
    }

    pub async fn profile(&self, user_id: i64) -> Result<Profile, LibraryError> {
        let user = self.user(user_id).await?;
        let catalog = self.books.all().await?;
        let borrowed_books = normalize(&user.borrowed, &CatalogIndex::from_books(&catalog));

        Ok(Profile {
            account: Account::from(&user),
            borrowed_count: borrowed_books.len(),
            borrowed_books,
        })
    }

    /// Books the reader currently holds. Records that match no book are skipped.
    pub async fn collection(&self, user_id: i64) -> Result<Vec<Book>, LibraryError> {
        let user = self.user(user_id).await?;

        let mut books = Vec::with_capacity(user.borrowed.len());
        for entry in &user.borrowed {
            let found = match entry {
                BorrowedEntry::Structured { book_id, .. } => self.books.find(*book_id).await?,
                BorrowedEntry::Legacy(title) => self.books.find_by_title(title).await?,
            };
            books.extend(found);
        }
        Ok(books)
    }

    async fn user(&self, user_id: i64) -> Result<User, LibraryError> {
        self.users
            .find(user_id)
            .await?
            .ok_or_else(|| LibraryError::user_not_found(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::users::models::BorrowedRef;
    use crate::testing::{library, ScriptedGenerator};
    use serde_json::json;

    fn sign_up(username: &str, email: &str) -> SignUp {
        SignUp {
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn sign_up_assigns_ids_and_rejects_duplicate_email() {
        let lib = library(ScriptedGenerator::failing());
        let ada = lib.accounts.sign_up(sign_up(" Ada ", "ada@example.org")).await.unwrap();
        let grace = lib.accounts.sign_up(sign_up("Grace", "grace@example.org")).await.unwrap();

        assert_eq!((ada.id, grace.id), (1, 2));
        assert_eq!(ada.name, "Ada");
        assert!(ada.borrowed.is_empty());

        let err = lib
            .accounts
            .sign_up(sign_up("Imposter", "ada@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateEmail(email) if email == "ada@example.org"));
    }

    #[tokio::test]
    async fn sign_up_requires_name_and_email() {
        let lib = library(ScriptedGenerator::failing());
        let err = lib.accounts.sign_up(sign_up("", "a@b.c")).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput { field: "username", .. }));
        let err = lib.accounts.sign_up(sign_up("Ada", "  ")).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput { field: "email", .. }));
    }

    #[tokio::test]
    async fn log_in_parses_and_resolves_id() {
        let lib = library(ScriptedGenerator::failing());
        let ada = lib.seed_user("ada").await;

        assert_eq!(lib.accounts.log_in(&json!(ada.id.to_string())).await.unwrap(), ada);

        let err = lib.accounts.log_in(&json!("abc")).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput { field: "user_id", .. }));

        let err = lib.accounts.log_in(&json!(404)).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { entity: "user", id: 404 }));
    }

    #[tokio::test]
    async fn profile_and_collection_resolve_legacy_records() {
        let lib = library(ScriptedGenerator::failing());
        let dune = lib.seed_book("Dune", 1).await;
        let emma = lib.seed_book("Emma", 1).await;
        let ada = lib
            .seed_user_with_borrowed(
                "ada",
                json!(["Dune", {"Book_id": emma.id}, "Middlemarch", {"Book_id": 77, "Title": "Gone"}]),
            )
            .await;

        let profile = lib.accounts.profile(ada.id).await.unwrap();
        assert_eq!(profile.borrowed_count, 4);
        assert_eq!(
            profile.borrowed_books[..3],
            [
                BorrowedRef {
                    book_id: Some(dune.id),
                    title: "Dune".into()
                },
                BorrowedRef {
                    book_id: Some(emma.id),
                    title: "Emma".into()
                },
                BorrowedRef {
                    book_id: None,
                    title: "Middlemarch".into()
                },
            ]
        );

        let held: Vec<i64> = lib
            .accounts
            .collection(ada.id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(held, vec![dune.id, emma.id]);
    }
}
