pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Module};
use serde_json::json;

use service::Accounts;

/// Reader accounts: sign-up, sign-in, profile and borrowed collection
pub struct UsersModule {
    accounts: Arc<Accounts>,
}

impl UsersModule {
    pub fn new(accounts: Arc<Accounts>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.accounts.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({"$ref": "#/components/schemas/ErrorResponse"});
        let welcome = json!({"$ref": "#/components/schemas/Welcome"});

        Some(json!({
            "paths": {
                "/signup": {
                    "post": {
                        "summary": "Create a reader account",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {
                                "type": "object",
                                "properties": {"username": {"type": "string"}, "email": {"type": "string"}},
                                "required": ["username", "email"]
                            }}}
                        },
                        "responses": {
                            "201": {"description": "Account created", "content": {"application/json": {"schema": welcome}}},
                            "409": {"description": "Email already registered", "content": {"application/json": {"schema": error}}},
                            "422": {"description": "Missing name or email", "content": {"application/json": {"schema": error}}}
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Sign in with a user id",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {
                                "type": "object",
                                "properties": {"user_id": {"type": "integer"}},
                                "required": ["user_id"]
                            }}}
                        },
                        "responses": {
                            "200": {"description": "Signed in", "content": {"application/json": {"schema": welcome}}},
                            "404": {"description": "Unknown user id", "content": {"application/json": {"schema": error}}}
                        }
                    }
                },
                "/profile": {
                    "get": {
                        "summary": "Account with normalized borrowed list",
                        "tags": ["Users"],
                        "responses": {"200": {"description": "Profile"}}
                    }
                },
                "/collection": {
                    "get": {
                        "summary": "Books currently held by the reader",
                        "tags": ["Users"],
                        "responses": {"200": {"description": "Borrowed books"}}
                    }
                }
            },
            "components": {
                "schemas": {
                    "Welcome": {
                        "type": "object",
                        "properties": {
                            "account": {
                                "type": "object",
                                "properties": {
                                    "user_id": {"type": "integer"},
                                    "username": {"type": "string"},
                                    "email": {"type": "string"}
                                }
                            },
                            "message": {"type": "string"}
                        }
                    }
                }
            }
        }))
    }
}

pub fn create_module(accounts: Arc<Accounts>) -> Arc<dyn Module> {
    Arc::new(UsersModule::new(accounts))
}
