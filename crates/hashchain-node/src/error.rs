use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hashchain_core::LedgerError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("block {0} not found")]
    BlockNotFound(u64),

    #[error("tamper route is disabled")]
    TamperDisabled,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BlockNotFound(_) | ApiError::Ledger(LedgerError::BlockNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            ApiError::TamperDisabled => StatusCode::FORBIDDEN,
            ApiError::Ledger(_) | ApiError::Worker(_) => {
                error!(error = %self, "ledger fault");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
