use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserPatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email '{0}' is already taken")]
    Conflict(String),
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Keyed persistence for user records.
///
/// Implementations own email uniqueness: `create` and `update` must fail with
/// [`StoreError::Conflict`] rather than let two live records share an email,
/// and `update` must apply the whole patch or nothing.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Apply the `Some` fields of `patch` to the record having `id`, leaving
    /// every other column as currently stored.
    async fn update(&self, id: Uuid, patch: &UserPatch) -> Result<User, StoreError>;

    /// Hard delete. Returns false when nothing had that id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;
}
