//! Libris application library
//!
//! Catalog, lending ledger, reader accounts and the librarian assistant,
//! mounted as modules on the libris kernel.

pub mod error;
pub mod modules;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use error::LibraryError;
pub use modules::{register_all, Services};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use libris_db::{MemoryStore, StoreModule};
use libris_genai::GeneratorModule;
use libris_kernel::settings::{DatabaseSettings, Settings};
use libris_kernel::{InitCtx, ModuleRegistry};

/// Open the document store, loading the snapshot when one is configured
pub async fn open_store(settings: &DatabaseSettings) -> anyhow::Result<Arc<MemoryStore>> {
    let store = match &settings.snapshot_path {
        Some(path) => MemoryStore::open(path)
            .await
            .with_context(|| format!("failed to open snapshot {}", path.display()))?,
        None => MemoryStore::new(),
    };
    Ok(Arc::new(store))
}

/// Wire every module, serve HTTP until ctrl-c, then shut modules down
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = open_store(&settings.database).await?;
    let generator = libris_genai::from_settings(&settings.assistant)
        .context("failed to build text generator")?;
    let services = Services::new(
        store.clone(),
        generator,
        Duration::from_millis(settings.assistant.timeout_ms),
    );

    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(StoreModule::new(store)));
    registry.register_core(Arc::new(GeneratorModule));
    register_all(&mut registry, &services);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let app = libris_http::build_router(&registry, &settings);
    let served = libris_http::start_server(app, &settings, shutdown_signal()).await;

    registry.stop_all().await?;
    served
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
