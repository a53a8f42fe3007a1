use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use libris_http::{AppError, CurrentUser};
use serde::Deserialize;

use super::service::{Assistant, AssistantReply};

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

pub fn router(assistant: Arc<Assistant>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .with_state(assistant)
}

async fn chat(
    CurrentUser(user_id): CurrentUser,
    State(assistant): State<Arc<Assistant>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<AssistantReply>, AppError> {
    tracing::debug!(user_id, "assistant chat");
    Ok(Json(assistant.ask(&request.message).await?))
}
