use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use libris_http::{AppError, CurrentUser};
use serde_json::Value;

use super::models::{AddBook, Book, BookDetail};
use super::service::Catalog;
use crate::utils::parse_integer;

pub fn router(catalog: Arc<Catalog>) -> Router {
    Router::new()
        .route("/", get(list_books).post(add_book))
        .route("/available", get(list_available))
        .route("/{book_id}", get(book_detail))
        .with_state(catalog)
}

async fn list_books(
    _user: CurrentUser,
    State(catalog): State<Arc<Catalog>>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(catalog.list_books().await?))
}

async fn list_available(
    _user: CurrentUser,
    State(catalog): State<Arc<Catalog>>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(catalog.list_available().await?))
}

async fn add_book(
    _user: CurrentUser,
    State(catalog): State<Arc<Catalog>>,
    Json(request): Json<AddBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = catalog.add_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn book_detail(
    _user: CurrentUser,
    State(catalog): State<Arc<Catalog>>,
    Path(book_id): Path<String>,
) -> Result<Json<BookDetail>, AppError> {
    let book_id = parse_integer("book_id", &Value::String(book_id))?;
    Ok(Json(catalog.book_detail(book_id).await?))
}
