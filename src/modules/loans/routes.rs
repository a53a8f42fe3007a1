use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use libris_http::{AppError, CurrentUser};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ledger::Ledger;
use crate::modules::users::models::BorrowedRef;
use crate::utils::parse_integer;

#[derive(Debug, Deserialize)]
struct LoanRequest {
    #[serde(default)]
    book_id: Value,
}

#[derive(Debug, Serialize)]
struct LoanReceipt {
    book_id: i64,
    title: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct BorrowedView {
    borrowed_books: Vec<BorrowedRef>,
}

pub fn router(ledger: Arc<Ledger>) -> Router {
    Router::new()
        .route("/borrowed", get(borrowed))
        .route("/borrow", post(borrow))
        .route("/return", post(return_book))
        .with_state(ledger)
}

async fn borrowed(
    CurrentUser(user_id): CurrentUser,
    State(ledger): State<Arc<Ledger>>,
) -> Result<Json<BorrowedView>, AppError> {
    let borrowed_books = ledger.borrowed(user_id).await?;
    Ok(Json(BorrowedView { borrowed_books }))
}

async fn borrow(
    CurrentUser(user_id): CurrentUser,
    State(ledger): State<Arc<Ledger>>,
    Json(request): Json<LoanRequest>,
) -> Result<Json<LoanReceipt>, AppError> {
    let book_id = parse_integer("book_id", &request.book_id)?;
    let title = ledger.borrow(user_id, book_id).await?;
    let message = format!("Successfully borrowed '{title}'! Please return it within 14 days.");
    Ok(Json(LoanReceipt {
        book_id,
        title,
        message,
    }))
}

async fn return_book(
    CurrentUser(user_id): CurrentUser,
    State(ledger): State<Arc<Ledger>>,
    Json(request): Json<LoanRequest>,
) -> Result<Json<LoanReceipt>, AppError> {
    let book_id = parse_integer("book_id", &request.book_id)?;
    let title = ledger.return_book(user_id, book_id).await?;
    let message = format!("Successfully returned '{title}'. Thank you!");
    Ok(Json(LoanReceipt {
        book_id,
        title,
        message,
    }))
}
