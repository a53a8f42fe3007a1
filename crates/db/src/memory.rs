use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Collection, Document, Filter, Update};
use crate::{DocumentStore, StoreError};

/// On-disk layout of a snapshot file
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(rename = "Users", default)]
    users: Vec<Document>,
    #[serde(rename = "Books", default)]
    books: Vec<Document>,
}

#[derive(Default)]
struct Table {
    documents: DashMap<i64, Document>,
    last_id: AtomicI64,
}

impl Table {
    fn sorted_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.documents.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    fn matching(&self, filter: &Filter) -> Vec<Document> {
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| {
                self.documents
                    .get(&id)
                    .filter(|doc| filter.matches(doc))
                    .map(|doc| doc.value().clone())
            })
            .collect()
    }
}

/// In-process document store.
///
/// Ids come from a per-collection counter that is seeded from the largest id
/// seen in the snapshot, so concurrent inserts never collide.
pub struct MemoryStore {
    users: Table,
    books: Table,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Empty store without persistence
    pub fn new() -> Self {
        Self {
            users: Table::default(),
            books: Table::default(),
            snapshot_path: None,
        }
    }

    /// Open a store backed by a JSON snapshot. A missing file yields an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self::new();

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
                for document in snapshot.users {
                    store.load_document(Collection::Users, document)?;
                }
                for document in snapshot.books {
                    store.load_document(Collection::Books, document)?;
                }
                tracing::info!(
                    path = %path.display(),
                    users = store.users.documents.len(),
                    books = store.books.documents.len(),
                    "loaded store snapshot"
                );
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no snapshot found, starting empty");
            }
            Err(err) => return Err(err.into()),
        }

        store.snapshot_path = Some(path);
        Ok(store)
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Write every collection to the snapshot file, if one is configured
    pub async fn save_snapshot(&self) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let snapshot = Snapshot {
            users: self.users.matching(&Filter::all()),
            books: self.books.matching(&Filter::all()),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, path).await?;

        tracing::info!(path = %path.display(), "store snapshot written");
        Ok(())
    }

    fn table(&self, collection: Collection) -> &Table {
        match collection {
            Collection::Users => &self.users,
            Collection::Books => &self.books,
        }
    }

    fn load_document(&self, collection: Collection, document: Document) -> Result<(), StoreError> {
        let id = document
            .get(collection.id_field())
            .and_then(Value::as_i64)
            .ok_or_else(|| StoreError::Corrupt {
                collection,
                reason: format!("missing integer {}", collection.id_field()),
            })?;

        let table = self.table(collection);
        table.last_id.fetch_max(id, Ordering::SeqCst);
        table.documents.insert(id, document);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let table = self.table(collection);
        Ok(table.sorted_ids().into_iter().find_map(|id| {
            table
                .documents
                .get(&id)
                .filter(|doc| filter.matches(doc))
                .map(|doc| doc.value().clone())
        }))
    }

    async fn find_all(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self.table(collection).matching(filter))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<i64, StoreError> {
        let table = self.table(collection);
        let id = table.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        document.insert(collection.id_field().to_string(), Value::from(id));
        table.documents.insert(id, document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<bool, StoreError> {
        let table = self.table(collection);
        for id in table.sorted_ids() {
            // The filter is re-checked while the entry is write-locked.
            let Some(mut document) = table.documents.get_mut(&id) else {
                continue;
            };
            if !filter.matches(&document) {
                continue;
            }
            update
                .apply(&mut document)
                .map_err(|reason| StoreError::Corrupt { collection, reason })?;
            return Ok(true);
        }
        Ok(false)
    }
}
