use std::sync::Arc;

use crate::auth::{
    jwt::{JwtKeys, JwtRootValidator},
    StaticTokenValidator, TokenValidator,
};
use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::users::{memory::InMemoryUserStore, pg::PgUserStore, repo::UserStore, UserManager};

#[derive(Clone)]
pub struct AppState {
    pub users: UserManager,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store: Arc<dyn UserStore> = match config.store {
            StoreBackend::Postgres => {
                let pool = db::connect(&config).await?;
                db::migrate(&pool).await?;
                Arc::new(PgUserStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory user store; data is lost on restart");
                Arc::new(InMemoryUserStore::new())
            }
        };

        let validator = token_validator(&config)?;
        let users = UserManager::new(store, validator, config.store_timeout);
        Ok(Self::from_parts(users, config))
    }

    pub fn from_parts(users: UserManager, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    #[cfg(test)]
    pub fn in_memory(root_token: &str) -> Self {
        use crate::config::RootConfig;
        use std::time::Duration;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            store: StoreBackend::Memory,
            database_url: None,
            root: RootConfig {
                email: "root@example.com".into(),
                password: None,
                name: "root".into(),
                token: Some(root_token.into()),
            },
            jwt: None,
            store_timeout: Duration::from_secs(5),
        });
        let users = UserManager::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(StaticTokenValidator::new(root_token)),
            config.store_timeout,
        );
        Self::from_parts(users, config)
    }
}

/// A fixed `ROOT_TOKEN` wins over JWT validation when both are configured.
pub fn token_validator(config: &AppConfig) -> anyhow::Result<Arc<dyn TokenValidator>> {
    if let Some(token) = &config.root.token {
        return Ok(Arc::new(StaticTokenValidator::new(token.clone())));
    }
    Ok(Arc::new(jwt_root_validator(config)?))
}

pub fn jwt_root_validator(config: &AppConfig) -> anyhow::Result<JwtRootValidator> {
    let jwt = config
        .jwt
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("JWT_SECRET is not configured"))?;
    Ok(JwtRootValidator::new(JwtKeys::from(jwt), config.root.email.clone()))
}
