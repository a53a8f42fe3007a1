use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use libris_http::{AppError, CurrentUser};
use serde::Serialize;

use super::models::{Account, Login, Profile, SignUp};
use super::service::Accounts;
use crate::modules::books::models::Book;

#[derive(Debug, Serialize)]
struct Welcome {
    account: Account,
    message: String,
}

#[derive(Debug, Serialize)]
struct CollectionView {
    books: Vec<Book>,
}

pub fn router(accounts: Arc<Accounts>) -> Router {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(log_in))
        .route("/profile", get(profile))
        .route("/collection", get(collection))
        .with_state(accounts)
}

async fn sign_up(
    State(accounts): State<Arc<Accounts>>,
    Json(request): Json<SignUp>,
) -> Result<(StatusCode, Json<Welcome>), AppError> {
    let user = accounts.sign_up(request).await?;
    let message = format!(
        "Welcome {}! Your account has been created successfully. Your User ID is: {}",
        user.name, user.id
    );
    Ok((
        StatusCode::CREATED,
        Json(Welcome {
            account: Account::from(&user),
            message,
        }),
    ))
}

async fn log_in(
    State(accounts): State<Arc<Accounts>>,
    Json(request): Json<Login>,
) -> Result<Json<Welcome>, AppError> {
    let user = accounts.log_in(&request.user_id).await?;
    let message = format!("Welcome back, {}!", user.name);
    Ok(Json(Welcome {
        account: Account::from(&user),
        message,
    }))
}

async fn profile(
    CurrentUser(user_id): CurrentUser,
    State(accounts): State<Arc<Accounts>>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(accounts.profile(user_id).await?))
}

async fn collection(
    CurrentUser(user_id): CurrentUser,
    State(accounts): State<Arc<Accounts>>,
) -> Result<Json<CollectionView>, AppError> {
    let books = accounts.collection(user_id).await?;
    Ok(Json(CollectionView { books }))
}
