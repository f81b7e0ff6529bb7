//! Standalone login endpoint checking against a fixed credential table.
//! It shares nothing with the `users` relation.

use std::{collections::HashMap, sync::Arc};

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::ApiError;

/// Read-only username → password table.
#[derive(Debug, Clone)]
pub struct Credentials(Arc<HashMap<String, String>>);

impl Credentials {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self(Arc::new(table))
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.0.get(username).is_some_and(|stored| stored == password)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

pub fn router(credentials: Credentials) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(credentials)
}

#[instrument(skip(credentials, payload))]
pub async fn login(
    State(credentials): State<Credentials>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !credentials.verify(&payload.username, &payload.password) {
        warn!(username = %payload.username, "invalid credentials");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }
    info!(username = %payload.username, "login successful");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
    }))
}
