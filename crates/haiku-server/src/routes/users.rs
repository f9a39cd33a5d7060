//! User routes.
//!
//! - GET /users - List user ids
//! - POST /user - Create a user with a generated id
//! - GET /user/{user} - Fetch a user

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use haiku_core::{User, UserId, UserList};

use crate::error::{ApiError, ApiResult};
use crate::extract::UserPath;
use crate::state::AppState;

/// GET /users - List the ids of all users.
async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserList>> {
    let users = state.store().list_users().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list users");
        ApiError::Store(e)
    })?;

    tracing::debug!(count = users.users.len(), "Listed users");
    Ok(Json(users))
}

/// POST /user - Create a user.
///
/// # Response
///
/// - 201 Created: the new `User`
/// - 409 Conflict: generated id already taken
async fn create_user(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<User>)> {
    let id = UserId::generate()?;

    let user = state.store().create_user(&id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create user");
        ApiError::Store(e)
    })?;

    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /user/{user} - Fetch a single user.
async fn get_user(
    State(state): State<AppState>,
    UserPath(user_id): UserPath,
) -> ApiResult<Json<User>> {
    let user = state.store().get_user(&user_id).await.map_err(|e| {
        if !e.is_not_found() {
            tracing::error!(user_id = %user_id, error = %e, "Failed to get user");
        }
        ApiError::Store(e)
    })?;

    Ok(Json(user))
}

/// Build user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/user", post(create_user))
        .route("/user/{user}", get(get_user))
}
