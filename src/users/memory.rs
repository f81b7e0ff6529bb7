use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::users::{
    repo::{StoreError, StoreResult, UniqueField, UserStore},
    repo_types::{UserChanges, UserRow},
};

/// In-process `UserStore` with the same unique constraints as the `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: Vec<UserRow>,
}

impl Inner {
    fn check_unique(&self, skip_id: Option<i64>, username: &str, email: &str) -> StoreResult<()> {
        let others = self.rows.iter().filter(|r| Some(r.user_id) != skip_id);
        for row in others {
            if row.username == username {
                return Err(StoreError::Duplicate(UniqueField::Username));
            }
            if row.email == email {
                return Err(StoreError::Duplicate(UniqueField::Email));
            }
        }
        Ok(())
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> StoreResult<Option<UserRow>> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_unique(None, username, email)?;
        inner.next_id += 1;
        let row = UserRow {
            user_id: inner.next_id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.rows.push(row.clone());
        Ok(Some(row))
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|r| r.username == username).cloned())
    }

    async fn get_user_by_id(&self, user_id: i64) -> StoreResult<Option<UserRow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|r| r.user_id == user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|r| r.email == email).cloned())
    }

    async fn update_user(
        &self,
        user_id: i64,
        changes: UserChanges,
    ) -> StoreResult<Option<UserRow>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(current) = inner.rows.iter().find(|r| r.user_id == user_id).cloned() else {
            return Ok(None);
        };
        let updated = UserRow {
            username: changes.username.unwrap_or(current.username),
            password_hash: changes.password_hash.unwrap_or(current.password_hash),
            email: changes.email.unwrap_or(current.email),
            ..current
        };
        inner.check_unique(Some(user_id), &updated.username, &updated.email)?;
        if let Some(slot) = inner.rows.iter_mut().find(|r| r.user_id == user_id) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn delete_user(&self, user_id: i64) -> StoreResult<Option<UserRow>> {
        let mut inner = self.inner.lock().unwrap();
        let pos = inner.rows.iter().position(|r| r.user_id == user_id);
        Ok(pos.map(|i| inner.rows.remove(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryUserStore::new();
        let a = store.insert_user("a", "pw", "a@x.io").await.unwrap().unwrap();
        let b = store.insert_user("b", "pw", "b@x.io").await.unwrap().unwrap();
        assert_eq!(a.user_id, 1);
        assert_eq!(b.user_id, 2);
    }

    #[tokio::test]
    async fn insert_enforces_unique_email() {
        let store = MemoryUserStore::new();
        store.insert_user("a", "pw", "a@x.io").await.unwrap();
        let err = store.insert_user("b", "pw", "a@x.io").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Email)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn get_user_by_email_requires_matching_password() {
        let store = MemoryUserStore::new();
        store.insert_user("a", "pw", "a@x.io").await.unwrap();
        assert!(store.get_user_by_email("a@x.io", "pw").await.unwrap().is_some());
        assert!(store.get_user_by_email("a@x.io", "nope").await.unwrap().is_none());
        assert!(store.get_user_by_email("b@x.io", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_provided_fields() {
        let store = MemoryUserStore::new();
        let created = store.insert_user("a", "pw", "a@x.io").await.unwrap().unwrap();
        let changes = UserChanges {
            email: Some("new@x.io".into()),
            ..Default::default()
        };
        let updated = store.update_user(created.user_id, changes).await.unwrap().unwrap();
        assert_eq!(updated.username, "a");
        assert_eq!(updated.password_hash, "pw");
        assert_eq!(updated.email, "new@x.io");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_may_keep_own_identity() {
        let store = MemoryUserStore::new();
        let created = store.insert_user("a", "pw", "a@x.io").await.unwrap().unwrap();
        let changes = UserChanges {
            username: Some("a".into()),
            ..Default::default()
        };
        assert!(store.update_user(created.user_id, changes).await.is_ok());
    }
}
