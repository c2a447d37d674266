use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::repo::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Email already registered")]
    Conflict,
    #[error("User not found")]
    NotFound,
    #[error("Missing or invalid credential")]
    Unauthorized,
    #[error("{0}")]
    Invalid(String),
    #[error("User store timed out")]
    Unavailable,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for UserError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => UserError::Conflict,
            StoreError::NotFound => UserError::NotFound,
            StoreError::Backend(e) => UserError::Internal(e),
        }
    }
}

impl UserError {
    pub fn status(&self) -> StatusCode {
        match self {
            UserError::Conflict => StatusCode::CONFLICT,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Unauthorized => StatusCode::UNAUTHORIZED,
            UserError::Invalid(_) => StatusCode::BAD_REQUEST,
            UserError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            UserError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, message).into_response()
    }
}
