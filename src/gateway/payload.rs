use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::RerankedResponse;
use crate::scoring::RankedList;
use crate::transcript::Transcript;

use super::error::GatewayError;

/// Body of `POST /nlg/rerank`.
///
/// The canonical text comes from `response.text` (a filled response template) or,
/// failing that, from the top-level `text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RerankRequest {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub response: Option<Value>,

    #[serde(default)]
    pub tracker: Transcript,
}

impl RerankRequest {
    pub fn canonical_text(&self) -> Result<&str, GatewayError> {
        let from_template = self
            .response
            .as_ref()
            .and_then(|template| template.get("text"))
            .and_then(Value::as_str);

        from_template
            .or(self.text.as_deref())
            .ok_or_else(|| GatewayError::InvalidRequest("missing reply text".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankResponse {
    pub text: String,

    pub ranked: RankedList,

    /// The request's template with `text` replaced, when one was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl RerankResponse {
    pub fn new(reranked: RerankedResponse, template: Option<Value>) -> Self {
        let response = template.map(|t| reranked.apply_to_template(t));
        Self {
            text: reranked.text,
            ranked: reranked.ranked,
            response,
        }
    }
}
