use std::{future::Future, sync::Arc, time::Duration};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::{CreateUserRequest, PublicUser, UpdateUserRequest};
use super::error::UserError;
use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, UserPatch};
use crate::auth::{
    password::{hash_password, verify_password},
    Scope, TokenValidator,
};

const MIN_PASSWORD_LEN: usize = 8;

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Lookup key for an email taken from a path or query.
fn email_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn normalize_email(raw: &str) -> Result<String, UserError> {
    let email = email_key(raw);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(UserError::Invalid("Invalid email".into()));
    }
    Ok(email)
}

fn check_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(UserError::Invalid("Password too short".into()));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), UserError> {
    if name.trim().is_empty() {
        return Err(UserError::Invalid("Name must not be empty".into()));
    }
    Ok(())
}

/// CRUD over user records, with update and delete gated on a root credential.
///
/// Holds no state of its own; everything durable lives in the [`UserStore`].
#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn UserStore>,
    validator: Arc<dyn TokenValidator>,
    store_timeout: Duration,
}

impl UserManager {
    pub fn new(
        store: Arc<dyn UserStore>,
        validator: Arc<dyn TokenValidator>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            validator,
            store_timeout,
        }
    }

    async fn store_call<T, F>(&self, fut: F) -> Result<T, UserError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(res) => res.map_err(UserError::from),
            Err(_) => {
                warn!(timeout = ?self.store_timeout, "user store call timed out");
                Err(UserError::Unavailable)
            }
        }
    }

    fn authorize(&self, credential: Option<&str>) -> Result<(), UserError> {
        match credential.and_then(|c| self.validator.validate(c)) {
            Some(Scope::Root) => Ok(()),
            None => {
                warn!(presented = credential.is_some(), "unauthorized mutation attempt");
                Err(UserError::Unauthorized)
            }
        }
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<PublicUser, UserError> {
        let email = normalize_email(&req.email)?;
        check_password(&req.password)?;
        check_name(&req.name)?;

        if self.store_call(self.store.find_by_email(&email)).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(UserError::Conflict);
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .store_call(self.store.create(NewUser {
                email,
                name: req.name,
                password_hash,
            }))
            .await?;

        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user.into())
    }

    pub async fn get(&self, email: &str) -> Result<PublicUser, UserError> {
        self.store_call(self.store.find_by_email(&email_key(email)))
            .await?
            .map(PublicUser::from)
            .ok_or(UserError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<PublicUser>, UserError> {
        let users = self.store_call(self.store.list()).await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    /// Partial update: only the fields present in `fields` change.
    ///
    /// Everything is validated and hashed first, then only the supplied fields
    /// go to the store as one patch. A failure leaves the record as it was, and
    /// a concurrent update of other fields is not overwritten.
    pub async fn update(
        &self,
        email: &str,
        credential: Option<&str>,
        fields: UpdateUserRequest,
    ) -> Result<(), UserError> {
        self.authorize(credential)?;

        let current = self
            .store_call(self.store.find_by_email(&email_key(email)))
            .await?
            .ok_or(UserError::NotFound)?;

        if fields.is_empty() {
            return Ok(());
        }

        let mut patch = UserPatch::default();

        if let Some(new_email) = fields.email.as_deref() {
            let new_email = normalize_email(new_email)?;
            if new_email != current.email {
                let taken = self.store_call(self.store.find_by_email(&new_email)).await?;
                if taken.is_some_and(|other| other.id != current.id) {
                    warn!(email = %new_email, "email already registered");
                    return Err(UserError::Conflict);
                }
            }
            patch.email = Some(new_email);
        }

        if let Some(name) = fields.name {
            check_name(&name)?;
            patch.name = Some(name);
        }

        if let Some(password) = fields.password.as_deref() {
            check_password(password)?;
            patch.password_hash = Some(hash_password(password)?);
        }

        let saved = self.store_call(self.store.update(current.id, &patch)).await?;
        info!(user_id = %saved.id, email = %saved.email, "user updated");
        Ok(())
    }

    pub async fn delete(&self, email: &str, credential: Option<&str>) -> Result<(), UserError> {
        self.authorize(credential)?;

        let user = self
            .store_call(self.store.find_by_email(&email_key(email)))
            .await?
            .ok_or(UserError::NotFound)?;

        if !self.store_call(self.store.delete(user.id)).await? {
            return Err(UserError::NotFound);
        }

        info!(user_id = %user.id, email = %user.email, "user deleted");
        Ok(())
    }

    /// Creates the root account if it does not exist yet. Returns whether it
    /// was created. An existing account is never overwritten.
    pub async fn bootstrap_root(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<bool, UserError> {
        let existing = self
            .store_call(self.store.find_by_email(&email_key(email)))
            .await?;
        if let Some(existing) = existing {
            if !verify_password(password, &existing.password_hash)? {
                warn!(email = %existing.email, "stored root password differs from ROOT_PASSWORD");
            }
            return Ok(false);
        }

        let req = CreateUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        match self.create(req).await {
            Ok(_) => Ok(true),
            Err(UserError::Conflict) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
