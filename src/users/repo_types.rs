use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as stored. Never serialised directly: callers only ever see
/// [`PublicUser`](super::dto::PublicUser).
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: Uuid, // immutable once created
    pub email: String, // unique
    pub name: String,
    pub password_hash: String, // Argon2 PHC string
    pub last_login: Option<OffsetDateTime>, // owned by the login flow
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a new user. The store allocates `id`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Field-level change to a stored user. `None` fields keep their stored
/// value, so two patches touching different fields never undo each other.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.password_hash.is_none()
    }
}
