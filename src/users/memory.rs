//! In-memory user store, used by tests and `USER_STORE=memory`.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, User, UserPatch};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
    /// Insertion order, so `list` is stable between calls.
    order: Vec<Uuid>,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut t = self.inner.write().await;
        if t.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(user.email));
        }

        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            last_login: None,
            created_at: OffsetDateTime::now_utc(),
        };
        t.by_email.insert(record.email.clone(), record.id);
        t.order.push(record.id);
        t.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.inner.read().await;
        Ok(t.by_email.get(email).and_then(|id| t.users.get(id)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let t = self.inner.read().await;
        Ok(t.users.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> Result<User, StoreError> {
        let mut t = self.inner.write().await;
        let old_email = match t.users.get(&id) {
            Some(existing) => existing.email.clone(),
            None => return Err(StoreError::NotFound),
        };

        // all checks before the first write
        if let Some(email) = &patch.email {
            if *email != old_email {
                if t.by_email.contains_key(email) {
                    return Err(StoreError::Conflict(email.clone()));
                }
                t.by_email.remove(&old_email);
                t.by_email.insert(email.clone(), id);
            }
        }

        let stored = t.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(email) = &patch.email {
            stored.email = email.clone();
        }
        if let Some(name) = &patch.name {
            stored.name = name.clone();
        }
        if let Some(hash) = &patch.password_hash {
            stored.password_hash = hash.clone();
        }
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut t = self.inner.write().await;
        match t.users.remove(&id) {
            Some(user) => {
                t.by_email.remove(&user.email);
                t.order.retain(|o| *o != id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let t = self.inner.read().await;
        Ok(t.order
            .iter()
            .filter_map(|id| t.users.get(id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            name: "Test user".into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let store = InMemoryUserStore::new();
        let created = store.create(new_user("a@example.com")).await.expect("create");
        assert!(created.last_login.is_none());

        let by_email = store.find_by_email("a@example.com").await.expect("find");
        assert_eq!(by_email.as_ref(), Some(&created));
        let by_id = store.find_by_id(created.id).await.expect("find");
        assert_eq!(by_id, Some(created));
    }

    #[tokio::test]
    async fn create_duplicate_email_conflicts() {
        let store = InMemoryUserStore::new();
        store.create(new_user("a@example.com")).await.expect("create");
        let err = store.create(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(e) if e == "a@example.com"));
        assert_eq!(store.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn update_moves_email_index() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("a@example.com")).await.expect("create");
        let patch = UserPatch {
            email: Some("b@example.com".into()),
            ..Default::default()
        };
        store.update(user.id, &patch).await.expect("update");

        assert!(store.find_by_email("a@example.com").await.expect("find").is_none());
        assert_eq!(
            store.find_by_email("b@example.com").await.expect("find").map(|u| u.id),
            Some(user.id)
        );
    }

    #[tokio::test]
    async fn update_into_taken_email_leaves_record_alone() {
        let store = InMemoryUserStore::new();
        store.create(new_user("a@example.com")).await.expect("create a");
        let original = store.create(new_user("b@example.com")).await.expect("create b");

        let patch = UserPatch {
            email: Some("a@example.com".into()),
            name: Some("Changed".into()),
            password_hash: None,
        };
        let err = store.update(original.id, &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let after = store.find_by_id(original.id).await.expect("find");
        assert_eq!(after, Some(original));
        assert!(store.find_by_email("b@example.com").await.expect("find").is_some());
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("a@example.com")).await.expect("create");

        let renamed = UserPatch {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        store.update(user.id, &renamed).await.expect("rename");
        let rehashed = UserPatch {
            password_hash: Some("new-hash".into()),
            ..Default::default()
        };
        let saved = store.update(user.id, &rehashed).await.expect("rehash");

        assert_eq!(saved.name, "Renamed");
        assert_eq!(saved.password_hash, "new-hash");
        assert_eq!(saved.email, user.email);
        assert_eq!(saved.last_login, None);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let store = InMemoryUserStore::new();
        let patch = UserPatch {
            name: Some("x".into()),
            ..Default::default()
        };
        let err = store.update(Uuid::new_v4(), &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_record_and_email() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("a@example.com")).await.expect("create");
        assert!(store.delete(user.id).await.expect("delete"));
        assert!(!store.delete(user.id).await.expect("delete again"));
        assert!(store.list().await.expect("list").is_empty());
        // email is free again
        store.create(new_user("a@example.com")).await.expect("re-create");
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let store = InMemoryUserStore::new();
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            store.create(new_user(email)).await.expect("create");
        }
        let emails: Vec<_> = store
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, ["a@example.com", "b@example.com", "c@example.com"]);
    }
}
