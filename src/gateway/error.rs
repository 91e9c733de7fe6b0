use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::constants::RERANK_STATUS_HEADER;
use crate::pipeline::RerankError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Rerank(#[from] RerankError),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    pub code: u16,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Rerank(err) => match err {
                RerankError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
                RerankError::InsufficientContext => StatusCode::UNPROCESSABLE_ENTITY,
                RerankError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                RerankError::EmbeddingDimensionMismatch { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::Rerank(err) => err.kind(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();

        if status.is_server_error() {
            tracing::error!(kind, error = %self, "Rerank request failed");
        } else {
            tracing::debug!(kind, error = %self, "Rerank request rejected");
        }

        let mut headers = HeaderMap::new();
        headers.insert(RERANK_STATUS_HEADER, HeaderValue::from_static(kind));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            kind,
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
