pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Module};
use serde_json::json;

use service::Assistant;

pub struct AssistantModule {
    assistant: Arc<Assistant>,
}

impl AssistantModule {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self { assistant }
    }
}

#[async_trait]
impl Module for AssistantModule {
    fn name(&self) -> &'static str {
        "assistant"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if !ctx.settings.assistant.is_configured() {
            tracing::warn!(
                module = self.name(),
                "no generation API key configured; chat will answer with the fallback reply"
            );
        }
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.assistant.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/chat": {
                    "post": {
                        "summary": "Ask the librarian assistant",
                        "tags": ["Assistant"],
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {
                                "type": "object",
                                "properties": {"message": {"type": "string"}},
                                "required": ["message"]
                            }}}
                        },
                        "responses": {
                            "200": {"description": "Reply, possibly the fallback text", "content": {"application/json": {"schema": {
                                "type": "object",
                                "properties": {
                                    "text": {"type": "string"},
                                    "status": {"type": "string", "enum": ["answered", "assistant_unavailable"]}
                                }
                            }}}},
                            "422": {"description": "Blank message", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ErrorResponse"}}}}
                        }
                    }
                }
            }
        }))
    }
}

pub fn create_module(assistant: Arc<Assistant>) -> Arc<dyn Module> {
    Arc::new(AssistantModule::new(assistant))
}
