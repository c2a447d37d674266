use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::Credential,
    state::AppState,
    users::{
        dto::{CreateUserRequest, PublicUser, UpdateUserRequest},
        error::UserError,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:email",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), UserError> {
    let user = state.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<PublicUser>, UserError> {
    Ok(Json(state.users.get(&email).await?))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, UserError> {
    Ok(Json(state.users.list().await?))
}

#[instrument(skip(state, credential, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    credential: Credential,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<StatusCode, UserError> {
    state
        .users
        .update(&email, credential.as_deref(), payload)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, credential))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    credential: Credential,
) -> Result<StatusCode, UserError> {
    state.users.delete(&email, credential.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
