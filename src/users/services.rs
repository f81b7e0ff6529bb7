use tracing::{debug, info, warn};

use crate::{
    error::ApiError,
    users::{
        dto::{CreateUserRequest, LoginRequest, PublicUser, UpdateUserRequest},
        repo::UserStore,
    },
};

/// Treats a missing or empty identifier the same way.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub async fn create_user(
    store: &dyn UserStore,
    req: CreateUserRequest,
) -> Result<PublicUser, ApiError> {
    if store.get_user(&req.username).await?.is_some() {
        warn!(username = %req.username, "username already exists");
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    if store.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already exists");
        return Err(ApiError::Conflict("Email already exists".into()));
    }

    // A concurrent create can still slip past the checks above; the unique
    // constraints turn that into the same conflict.
    let user = store
        .insert_user(&req.username, &req.password_hash, &req.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Error creating user".into()))?;

    info!(user_id = user.user_id, username = %user.username, "user created");
    Ok(user.into())
}

pub async fn read_user(store: &dyn UserStore, user_id: i64) -> Result<PublicUser, ApiError> {
    store
        .get_user_by_id(user_id)
        .await?
        .map(PublicUser::from)
        .ok_or_else(ApiError::user_not_found)
}

pub async fn update_user(
    store: &dyn UserStore,
    user_id: i64,
    req: UpdateUserRequest,
) -> Result<PublicUser, ApiError> {
    let user = store
        .update_user(user_id, req.into())
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    info!(user_id, "user updated");
    Ok(user.into())
}

pub async fn delete_user(store: &dyn UserStore, user_id: i64) -> Result<(), ApiError> {
    store
        .delete_user(user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    info!(user_id, "user deleted");
    Ok(())
}

/// Unknown account and wrong password produce the same error.
pub async fn login(store: &dyn UserStore, req: LoginRequest) -> Result<PublicUser, ApiError> {
    let user = match (present(&req.email), present(&req.username)) {
        (Some(email), _) => store.get_user_by_email(email, &req.password_hash).await?,
        (None, Some(username)) => store.get_user(username).await?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Must provide either email or username for login".into(),
            ))
        }
    };

    match user {
        Some(user) if user.password_hash == req.password_hash => {
            info!(user_id = user.user_id, "user logged in");
            Ok(user.into())
        }
        _ => {
            debug!("login rejected");
            Err(ApiError::invalid_login())
        }
    }
}
