use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use crate::constants::{RERANK_STATUS_FALLBACK, RERANK_STATUS_HEADER, RERANK_STATUS_RANKED};
use crate::embedding::DualEncoder;

use super::error::GatewayError;
use super::payload::{RerankRequest, RerankResponse};
use super::state::HandlerState;

#[instrument(skip(state, body), fields(events = tracing::field::Empty))]
pub async fn rerank_handler<E>(
    State(state): State<HandlerState<E>>,
    body: Bytes,
) -> Result<Response, GatewayError>
where
    E: DualEncoder + 'static,
{
    // Raw body so content-type and syntax errors share the gateway's error shape.
    let request: RerankRequest = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request body: {}", e)))?;
    tracing::Span::current().record("events", request.tracker.len());

    let canonical = request.canonical_text()?;
    debug!(canonical_len = canonical.len(), "Processing rerank request");

    let reranked = if state.fallback_to_canonical {
        state
            .pipeline
            .rerank_or_canonical(canonical, &request.tracker)
            .await?
    } else {
        state.pipeline.rerank(canonical, &request.tracker).await?
    };

    let status = if reranked.is_fallback() {
        RERANK_STATUS_FALLBACK
    } else {
        RERANK_STATUS_RANKED
    };
    info!(status, candidates = reranked.ranked.len(), "Rerank complete");

    let mut headers = HeaderMap::new();
    headers.insert(RERANK_STATUS_HEADER, HeaderValue::from_static(status));

    let body = RerankResponse::new(reranked, request.response);
    Ok((headers, Json(body)).into_response())
}
