use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use libris_app::{register_all, Services};
use libris_db::MemoryStore;
use libris_genai::{GenerationError, TextGenerator};
use libris_kernel::{settings::Settings, ModuleRegistry};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Unreachable;

#[async_trait]
impl TextGenerator for Unreachable {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let services = Services::new(store, Arc::new(Unreachable), Duration::from_millis(200));
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, &services);
    libris_http::build_router(&registry, &Settings::default())
}

async fn call(app: &Router, method: &str, uri: &str, user: Option<i64>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn sign_up_borrow_and_return_over_http() {
    let app = app();

    let (status, body) = call(
        &app,
        "POST",
        "/api/users/signup",
        None,
        Some(json!({"username": "Ada", "email": "ada@example.org"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ada = body["account"]["user_id"].as_i64().unwrap();
    assert!(body["message"].as_str().unwrap().ends_with(&format!("Your User ID is: {ada}")));

    let (status, book) = call(
        &app,
        "POST",
        "/api/books",
        Some(ada),
        Some(json!({"title": "Dune", "authors": "Frank Herbert", "genres": "Science Fiction", "copies": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let dune = book["Book_id"].as_i64().unwrap();

    let (status, receipt) = call(&app, "POST", "/api/loans/borrow", Some(ada), Some(json!({"book_id": dune}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        receipt["message"],
        "Successfully borrowed 'Dune'! Please return it within 14 days."
    );

    let (status, available) = call(&app, "GET", "/api/books/available", Some(ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(available, json!([]));

    let (status, body) = call(&app, "POST", "/api/loans/borrow", Some(ada), Some(json!({"book_id": dune}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "already_borrowed");

    let (_, borrowed) = call(&app, "GET", "/api/loans/borrowed", Some(ada), None).await;
    assert_eq!(borrowed["borrowed_books"], json!([{"Book_id": dune, "Title": "Dune"}]));

    let (status, receipt) = call(&app, "POST", "/api/loans/return", Some(ada), Some(json!({"book_id": dune}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["message"], "Successfully returned 'Dune'. Thank you!");

    let (status, body) = call(&app, "POST", "/api/loans/return", Some(ada), Some(json!({"book_id": dune}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "not_borrowed");
}

#[tokio::test]
async fn errors_use_the_standard_envelope() {
    let app = app();

    let (status, _) = call(&app, "GET", "/api/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, "GET", "/api/books/42", Some(1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["trace_id"].is_string());

    let (status, body) = call(&app, "POST", "/api/loans/borrow", Some(1), Some(json!({"book_id": "abc"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"][0]["field"], "book_id");
}

#[tokio::test]
async fn assistant_falls_back_when_generation_fails() {
    let app = app();

    let (status, reply) = call(
        &app,
        "POST",
        "/api/assistant/chat",
        Some(1),
        Some(json!({"message": "recommend something"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["status"], "assistant_unavailable");
    assert_eq!(reply["text"], libris_app::modules::assistant::service::FALLBACK_REPLY);
}

#[tokio::test]
async fn openapi_lists_module_paths() {
    let app = app();
    let (status, spec) = call(&app, "GET", "/docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/loans/borrow"]["post"].is_object());
    assert!(spec["paths"]["/api/books/{book_id}"]["get"].is_object());
}
