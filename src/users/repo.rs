use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::users::repo_types::{UserChanges, UserRow};

/// Column guarded by a unique constraint on `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate {0:?}")]
    Duplicate(UniqueField),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Access to the `users` relation. Every call is a single statement.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> StoreResult<Option<UserRow>>;

    /// Find a user by username.
    async fn get_user(&self, username: &str) -> StoreResult<Option<UserRow>>;

    async fn get_user_by_id(&self, user_id: i64) -> StoreResult<Option<UserRow>>;

    /// Find a user by email without looking at the password.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRow>>;

    /// Find a user by email and return it only when `password_hash` matches the stored value.
    async fn get_user_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<UserRow>> {
        Ok(self
            .find_by_email(email)
            .await?
            .filter(|user| user.password_hash == password_hash))
    }

    async fn update_user(&self, user_id: i64, changes: UserChanges)
        -> StoreResult<Option<UserRow>>;

    /// Delete a user, returning the removed row.
    async fn delete_user(&self, user_id: i64) -> StoreResult<Option<UserRow>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("users_email_key") => UniqueField::Email,
                _ => UniqueField::Username,
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> StoreResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, email)
            VALUES ($1, $2, $3)
            RETURNING user_id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_error)?;
        Ok(user)
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: i64) -> StoreResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, email, password_hash, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: i64,
        changes: UserChanges,
    ) -> StoreResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                email = COALESCE($4, email)
            WHERE user_id = $1
            RETURNING user_id, username, email, password_hash, created_at
            "#,
        )
        .bind(user_id)
        .bind(changes.username)
        .bind(changes.password_hash)
        .bind(changes.email)
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_error)?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> StoreResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            DELETE FROM users
            WHERE user_id = $1
            RETURNING user_id, username, email, password_hash, created_at
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
