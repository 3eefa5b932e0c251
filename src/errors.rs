use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::DbUnavailable;

/// Body returned when a pipeline run fails after input validation passed.
#[derive(Debug, Serialize)]
pub struct PipelineFailure {
    pub error: String,
    pub message: &'static str,
}

/// Error type of the analysis handlers: plain status/message pairs like the
/// rest of the API, plus the structured pipeline failure.
#[derive(Debug)]
pub enum ApiError {
    Status(StatusCode, String),
    Pipeline(StatusCode, PipelineFailure),
}

impl ApiError {
    pub fn pipeline(status: StatusCode, error: impl std::fmt::Display, message: &'static str) -> Self {
        Self::Pipeline(
            status,
            PipelineFailure {
                error: error.to_string(),
                message,
            },
        )
    }
}

impl From<(StatusCode, String)> for ApiError {
    fn from((status, msg): (StatusCode, String)) -> Self {
        Self::Status(status, msg)
    }
}

impl From<DbUnavailable> for ApiError {
    fn from(e: DbUnavailable) -> Self {
        let (status, msg): (StatusCode, String) = e.into();
        Self::Status(status, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Status(status, msg) => (status, msg).into_response(),
            ApiError::Pipeline(status, body) => (status, Json(body)).into_response(),
        }
    }
}

pub fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
