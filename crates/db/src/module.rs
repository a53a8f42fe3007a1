use std::sync::Arc;

use async_trait::async_trait;
use libris_kernel::{InitCtx, Module};

use crate::MemoryStore;

/// Lifecycle hook for the document store: reports on startup, persists on shutdown
pub struct StoreModule {
    store: Arc<MemoryStore>,
}

impl StoreModule {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for StoreModule {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        match self.store.snapshot_path() {
            Some(path) => tracing::info!(
                module = self.name(),
                snapshot = %path.display(),
                "document store ready"
            ),
            None => tracing::warn!(
                module = self.name(),
                "document store is memory-only; data is lost on shutdown"
            ),
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.save_snapshot().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Collection, DocumentStore, Filter};
    use serde_json::json;

    #[tokio::test]
    async fn stop_persists_snapshot() {
        let path = std::env::temp_dir().join(format!("libris-module-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let store = Arc::new(MemoryStore::open(&path).await.unwrap());
        let document = json!({"Title": "Dune"}).as_object().cloned().unwrap();
        store.insert_one(Collection::Books, document).await.unwrap();

        StoreModule::new(store).stop().await.unwrap();

        let reopened = MemoryStore::open(&path).await.unwrap();
        let books = reopened.find_all(Collection::Books, &Filter::all()).await.unwrap();
        assert_eq!(books.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }
}
