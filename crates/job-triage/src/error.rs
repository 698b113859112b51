use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::search::FetchError;
use crate::workflows::triage::{BoardError, RefreshError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Everything that can stop the service or a CLI command.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("board error: {0}")]
    Board(#[from] BoardError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Fetch(FetchError::MissingCredentials) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Board(BoardError::NoLiveSnapshot) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Board(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<RefreshError> for AppError {
    fn from(value: RefreshError) -> Self {
        match value {
            RefreshError::Fetch(err) => Self::Fetch(err),
            RefreshError::Board(err) => Self::Board(err),
        }
    }
}
