pub mod ledger;
pub mod normalize;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Module};
use serde_json::json;

use ledger::Ledger;

/// Borrowing and returning copies
pub struct LoansModule {
    ledger: Arc<Ledger>,
}

impl LoansModule {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Module for LoansModule {
    fn name(&self) -> &'static str {
        "loans"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "loans module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.ledger.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({"$ref": "#/components/schemas/ErrorResponse"});
        let receipt = json!({"$ref": "#/components/schemas/LoanReceipt"});
        let request = json!({
            "required": true,
            "content": {"application/json": {"schema": {
                "type": "object",
                "properties": {"book_id": {"type": "integer"}},
                "required": ["book_id"]
            }}}
        });

        Some(json!({
            "paths": {
                "/borrowed": {
                    "get": {
                        "summary": "Normalized borrowed list of the current reader",
                        "tags": ["Loans"],
                        "responses": {
                            "200": {"description": "Borrowed records", "content": {"application/json": {"schema": {
                                "type": "object",
                                "properties": {"borrowed_books": {"type": "array", "items": {"$ref": "#/components/schemas/BorrowedRef"}}}
                            }}}},
                            "404": {"description": "Unknown user", "content": {"application/json": {"schema": error}}}
                        }
                    }
                },
                "/borrow": {
                    "post": {
                        "summary": "Borrow one copy of a book",
                        "tags": ["Loans"],
                        "requestBody": request,
                        "responses": {
                            "200": {"description": "Borrowed", "content": {"application/json": {"schema": receipt}}},
                            "404": {"description": "Unknown book or user", "content": {"application/json": {"schema": error}}},
                            "409": {"description": "No copies left or already borrowed", "content": {"application/json": {"schema": error}}},
                            "422": {"description": "Book id is not an integer", "content": {"application/json": {"schema": error}}}
                        }
                    }
                },
                "/return": {
                    "post": {
                        "summary": "Return a borrowed book",
                        "tags": ["Loans"],
                        "requestBody": request,
                        "responses": {
                            "200": {"description": "Returned", "content": {"application/json": {"schema": receipt}}},
                            "404": {"description": "Unknown book or user", "content": {"application/json": {"schema": error}}},
                            "409": {"description": "Book is not in the borrowed list", "content": {"application/json": {"schema": error}}}
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BorrowedRef": {
                        "type": "object",
                        "properties": {
                            "Book_id": {"type": "integer", "description": "Absent match leaves this null"},
                            "Title": {"type": "string"}
                        }
                    },
                    "LoanReceipt": {
                        "type": "object",
                        "properties": {
                            "book_id": {"type": "integer"},
                            "title": {"type": "string"},
                            "message": {"type": "string"}
                        }
                    }
                }
            }
        }))
    }
}

pub fn create_module(ledger: Arc<Ledger>) -> Arc<dyn Module> {
    Arc::new(LoansModule::new(ledger))
}
