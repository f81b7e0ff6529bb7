use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, DeletedResponse, LoginRequest, PublicUser, UpdateUserRequest},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/create", post(create_user))
        .route("/users/login", post(login))
        .route(
            "/users/:user_id",
            get(read_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = services::create_user(state.users.as_ref(), payload).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn read_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = services::read_user(state.users.as_ref(), user_id).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = services::update_user(state.users.as_ref(), user_id, payload).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    services::delete_user(state.users.as_ref(), user_id).await?;
    Ok(Json(DeletedResponse {
        detail: "User deleted".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = services::login(state.users.as_ref(), payload).await?;
    Ok(Json(user))
}
