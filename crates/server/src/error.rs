use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recon_core::RecordError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("{}", .0.body_text())]
    InvalidJson(#[from] JsonRejection),

    #[error("Batch of {pairs} pairs exceeds the limit of {limit}")]
    BatchTooLarge { pairs: u64, limit: u64 },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Record(RecordError::DateParse { .. }) => {
                (StatusCode::BAD_REQUEST, "DATE_PARSE_ERROR")
            }
            AppError::Record(RecordError::InvalidRecord { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_RECORD")
            }
            AppError::InvalidJson(rejection) => match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "BODY_TOO_LARGE")
                }
                status => (status, "INVALID_JSON"),
            },
            AppError::BatchTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "BATCH_TOO_LARGE"),
            AppError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "error": code,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
