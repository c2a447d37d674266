use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, User, UserPatch};

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(e: sqlx::Error, email: &str, what: &'static str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(email.to_string())
        }
        _ => StoreError::Backend(anyhow::Error::new(e).context(what)),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password_hash, last_login, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, &user.email, "insert user"))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, last_login, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, last_login, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> Result<User, StoreError> {
        if patch.is_empty() {
            return self.find_by_id(id).await?.ok_or(StoreError::NotFound);
        }

        // column-wise COALESCE so concurrent patches on other fields survive;
        // last_login is left to the login flow
        let conflict_email = patch.email.as_deref().unwrap_or_default();
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET email = COALESCE($2, email),
                   name = COALESCE($3, name),
                   password_hash = COALESCE($4, password_hash)
             WHERE id = $1
            RETURNING id, email, name, password_hash, last_login, created_at
            "#,
        )
        .bind(id)
        .bind(patch.email.as_deref())
        .bind(patch.name.as_deref())
        .bind(patch.password_hash.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_write_error(e, conflict_email, "update user"))?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, last_login, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }
}
