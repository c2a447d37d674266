use anyhow::Context;

mod app;
mod auth;
mod config;
mod db;
mod state;
mod users;

use crate::config::AppConfig;
use crate::state::AppState;

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "accountd=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    // `accountd issue-root-token` prints a JWT for the root identity and exits.
    if std::env::args().nth(1).as_deref() == Some("issue-root-token") {
        let token = state::jwt_root_validator(&config)?.issue_root_token()?;
        println!("{}", token);
        return Ok(());
    }

    let app_state = AppState::init(config).await?;

    let root = &app_state.config.root;
    if let Some(password) = &root.password {
        let created = app_state
            .users
            .bootstrap_root(&root.email, password, &root.name)
            .await
            .context("bootstrap root account")?;
        if created {
            tracing::info!(email = %root.email, "root account created");
        }
    }

    let (host, port) = (app_state.config.host.clone(), app_state.config.port);
    app::serve(app::build_app(app_state), &host, port).await
}
