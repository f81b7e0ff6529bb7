use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRow {
    pub user_id: i64,                 // generated by the database
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,        // stored and compared as given
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,   // set by the database on insert
}

/// Fields to change on update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
}
