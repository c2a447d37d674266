use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Where user records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// The single privileged account allowed to update and delete users.
#[derive(Debug, Clone, Deserialize)]
pub struct RootConfig {
    pub email: String,
    pub password: Option<String>,
    pub name: String,
    /// Fixed bearer token; when set it replaces JWT validation.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub root: RootConfig,
    pub jwt: Option<JwtConfig>,
    pub store_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("USER_STORE").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => anyhow::bail!("unknown USER_STORE '{}'", other),
        };

        let database_url = lookup("DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required for the postgres user store");
        }

        let root = RootConfig {
            email: lookup("ROOT_EMAIL")
                .context("ROOT_EMAIL is required")?
                .trim()
                .to_lowercase(),
            password: lookup("ROOT_PASSWORD"),
            name: lookup("ROOT_NAME").unwrap_or_else(|| "root".into()),
            token: lookup("ROOT_TOKEN").filter(|t| !t.is_empty()),
        };

        let jwt = match lookup("JWT_SECRET") {
            Some(secret) => Some(JwtConfig {
                secret,
                issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "accountd".into()),
                audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "accountd-root".into()),
                ttl_minutes: lookup("JWT_TTL_MINUTES")
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(60),
            }),
            None => None,
        };
        if root.token.is_none() && jwt.is_none() {
            anyhow::bail!("either ROOT_TOKEN or JWT_SECRET must be set");
        }

        let port = match lookup("APP_PORT") {
            Some(p) => p.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };

        let store_timeout = Duration::from_secs(
            lookup("STORE_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5),
        );

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            store,
            database_url,
            root,
            jwt,
            store_timeout,
        })
    }
}
