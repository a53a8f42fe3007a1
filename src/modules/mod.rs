pub mod assistant;
pub mod books;
pub mod loans;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use libris_db::DocumentStore;
use libris_genai::TextGenerator;
use libris_kernel::ModuleRegistry;

use assistant::service::Assistant;
use books::{repository::BookRepository, service::Catalog};
use loans::ledger::Ledger;
use users::{repository::UserRepository, service::Accounts};

/// Domain services sharing one document store and one text generator
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<Catalog>,
    pub ledger: Arc<Ledger>,
    pub accounts: Arc<Accounts>,
    pub assistant: Arc<Assistant>,
}

impl Services {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
        generation_timeout: Duration,
    ) -> Self {
        let books = BookRepository::new(store.clone());
        let users = UserRepository::new(store);

        Self {
            catalog: Arc::new(Catalog::new(
                books.clone(),
                generator.clone(),
                generation_timeout,
            )),
            ledger: Arc::new(Ledger::new(books.clone(), users.clone())),
            accounts: Arc::new(Accounts::new(users, books.clone())),
            assistant: Arc::new(Assistant::new(books, generator, generation_timeout)),
        }
    }
}

/// Register every domain module with the registry
pub fn register_all(registry: &mut ModuleRegistry, services: &Services) {
    registry.register_domain(users::create_module(services.accounts.clone()));
    registry.register_domain(books::create_module(services.catalog.clone()));
    registry.register_domain(loans::create_module(services.ledger.clone()));
    registry.register_domain(assistant::create_module(services.assistant.clone()));
}
