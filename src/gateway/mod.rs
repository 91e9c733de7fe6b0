//! HTTP gateway (Axum) exposing the reranker as an NLG-style endpoint.
//!
//! Used by the `rerank` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::rerank_handler;
pub use payload::{RerankRequest, RerankResponse};
pub use state::HandlerState;

use crate::constants::{
    RERANK_STATUS_HEADER, RERANK_STATUS_HEALTHY, RERANK_STATUS_PENDING, RERANK_STATUS_READY,
};
use crate::embedding::DualEncoder;

pub fn create_router_with_state<E>(state: HandlerState<E>) -> Router
where
    E: DualEncoder + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<E>))
        .route("/nlg/rerank", post(rerank_handler::<E>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub encoder: &'static str,
    pub encoder_mode: &'static str,
    pub embedding_dim: Option<usize>,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        RERANK_STATUS_HEADER,
        HeaderValue::from_static(RERANK_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// `200` once the encoder can serve without loading; `503` while it is still lazy.
#[tracing::instrument(skip(state))]
pub async fn ready_handler<E>(State(state): State<HandlerState<E>>) -> Response
where
    E: DualEncoder + 'static,
{
    let encoder = state.pipeline.encoder();
    let is_ready = encoder.is_ready();

    let components = ComponentStatus {
        http: RERANK_STATUS_READY,
        encoder: if is_ready {
            RERANK_STATUS_READY
        } else {
            RERANK_STATUS_PENDING
        },
        encoder_mode: encoder.mode(),
        embedding_dim: encoder.embedding_dim(),
    };

    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, RERANK_STATUS_PENDING)
    };

    let mut headers = HeaderMap::new();
    headers.insert(RERANK_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
