pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Module};
use serde_json::json;

use service::Catalog;

/// Catalog browsing, book intake and lazily generated descriptions
pub struct BooksModule {
    catalog: Arc<Catalog>,
}

impl BooksModule {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.catalog.list_books().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = books.len(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({"$ref": "#/components/schemas/ErrorResponse"});
        let book = json!({"$ref": "#/components/schemas/Book"});
        let books = json!({"type": "array", "items": book});

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List every book in the catalog",
                        "tags": ["Books"],
                        "responses": {
                            "200": {"description": "Catalog", "content": {"application/json": {"schema": books}}}
                        }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/AddBook"}}}
                        },
                        "responses": {
                            "201": {"description": "Book added", "content": {"application/json": {"schema": book}}},
                            "422": {"description": "Invalid book fields", "content": {"application/json": {"schema": error}}}
                        }
                    }
                },
                "/available": {
                    "get": {
                        "summary": "List books with copies on the shelf",
                        "tags": ["Books"],
                        "responses": {
                            "200": {"description": "Borrowable books", "content": {"application/json": {"schema": books}}}
                        }
                    }
                },
                "/{book_id}": {
                    "get": {
                        "summary": "Book detail with description",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "book_id", "in": "path", "required": true, "schema": {"type": "integer"}}
                        ],
                        "responses": {
                            "200": {"description": "Book and description (null when none could be generated)"},
                            "404": {"description": "Unknown book", "content": {"application/json": {"schema": error}}}
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "Book_id": {"type": "integer"},
                            "Title": {"type": "string"},
                            "Authors": {"type": "array", "items": {"type": "string"}},
                            "Genres": {"type": "array", "items": {"type": "string"}},
                            "Total_copies": {"type": "integer"},
                            "Available_copies": {"type": "integer"},
                            "Description": {"type": "string"}
                        },
                        "required": ["Book_id", "Title", "Authors", "Genres", "Total_copies", "Available_copies"]
                    },
                    "AddBook": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "authors": {"type": "string", "description": "Comma-separated author names"},
                            "genres": {"type": "string", "description": "Comma-separated genres"},
                            "copies": {"type": "integer", "minimum": 1}
                        },
                        "required": ["title", "authors", "genres", "copies"]
                    }
                }
            }
        }))
    }
}

pub fn create_module(catalog: Arc<Catalog>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(catalog))
}
