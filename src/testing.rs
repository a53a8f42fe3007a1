//! Shared fixtures for service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use libris_db::{Collection, DocumentStore, MemoryStore};
use libris_genai::{GenerationError, TextGenerator};
use serde_json::{json, Value};

use crate::modules::assistant::service::Assistant;
use crate::modules::books::models::{Book, NewBookRecord};
use crate::modules::books::repository::BookRepository;
use crate::modules::books::service::Catalog;
use crate::modules::loans::ledger::Ledger;
use crate::modules::users::models::{NewUserRecord, User};
use crate::modules::users::repository::UserRepository;
use crate::modules::users::service::Accounts;
use crate::modules::Services;

#[derive(Default)]
struct Script {
    reply: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

/// Generator that answers every prompt with a fixed reply, or always fails
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    script: Arc<Script>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            script: Arc::new(Script {
                reply: Some(reply.to_string()),
                ..Script::default()
            }),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.script.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        *self.script.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.script
            .reply
            .clone()
            .ok_or(GenerationError::EmptyResponse)
    }
}

pub struct TestLibrary {
    pub store: Arc<MemoryStore>,
    pub books: BookRepository,
    pub users: UserRepository,
    pub catalog: Arc<Catalog>,
    pub ledger: Arc<Ledger>,
    pub accounts: Arc<Accounts>,
    pub assistant: Arc<Assistant>,
}

/// Fresh in-memory library wired to `generator`
pub fn library(generator: ScriptedGenerator) -> TestLibrary {
    let store = Arc::new(MemoryStore::new());
    let services = Services::new(store.clone(), Arc::new(generator), Duration::from_secs(1));

    TestLibrary {
        books: BookRepository::new(store.clone()),
        users: UserRepository::new(store.clone()),
        store,
        catalog: services.catalog,
        ledger: services.ledger,
        accounts: services.accounts,
        assistant: services.assistant,
    }
}

impl TestLibrary {
    pub async fn seed_book(&self, title: &str, copies: i64) -> Book {
        self.books
            .insert(NewBookRecord {
                title: title.to_string(),
                authors: vec!["Anon".to_string()],
                genres: vec!["Fiction".to_string()],
                total_copies: copies,
                available_copies: copies,
            })
            .await
            .unwrap()
    }

    pub async fn seed_user(&self, name: &str) -> User {
        self.users
            .insert(NewUserRecord {
                name: name.to_string(),
                email: format!("{name}@example.org"),
                borrowed: Vec::new(),
            })
            .await
            .unwrap()
    }

    /// Insert a user whose `borrowed_books` is stored exactly as given
    pub async fn seed_user_with_borrowed(&self, name: &str, borrowed: Value) -> User {
        let document = json!({
            "Username": name,
            "Email": format!("{name}@example.org"),
            "borrowed_books": borrowed,
        });
        let document = document.as_object().cloned().unwrap();
        let id = self.store.insert_one(Collection::Users, document).await.unwrap();
        self.users.find(id).await.unwrap().unwrap()
    }

    pub async fn available(&self, book_id: i64) -> i64 {
        self.books.find(book_id).await.unwrap().unwrap().available_copies
    }
}
