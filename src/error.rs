use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Per-ticker analysis failures.
///
/// The `Display` output is the diagnostic string reported in place of a
/// stage or sentiment label.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No data")]
    NoData,

    #[error("Insufficient data")]
    InsufficientData,

    #[error("Error: {0}")]
    ComputationFault(String),

    #[error("Error: {0}")]
    External(String),
}

impl AnalysisError {
    pub fn external(msg: impl Into<String>) -> Self {
        AnalysisError::External(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        AnalysisError::ComputationFault(msg.into())
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::External(format!("Request failed: {}", e))
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::NoData | AnalysisError::InsufficientData => {
                AppError::NotFound(e.to_string())
            }
            AnalysisError::ComputationFault(msg) => AppError::Internal(msg),
            AnalysisError::External(msg) => AppError::ExternalApi(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Reqwest(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AppError::SerdeJson(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Anyhow(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
