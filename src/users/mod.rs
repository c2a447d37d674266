use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod pg;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use services::UserManager;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
