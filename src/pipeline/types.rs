use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scoring::RankedList;

/// The chosen reply plus the full ranking it was chosen from.
///
/// `ranked` is empty when the canonical text was returned without ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankedResponse {
    pub text: String,
    #[serde(default)]
    pub ranked: RankedList,
}

impl RerankedResponse {
    /// Takes the head of `ranked`; `None` if it is empty.
    pub fn from_ranked(ranked: RankedList) -> Option<Self> {
        let text = ranked.top()?.text.clone();
        Some(Self { text, ranked })
    }

    /// Unranked response carrying the canonical text.
    pub fn canonical(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ranked: RankedList::default(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Writes the chosen text into a filled response template.
    ///
    /// Objects keep every other field; any other value is replaced by `{"text": ...}`.
    pub fn apply_to_template(&self, template: Value) -> Value {
        match template {
            Value::Object(mut fields) => {
                fields.insert("text".to_string(), Value::String(self.text.clone()));
                Value::Object(fields)
            }
            _ => serde_json::json!({ "text": self.text }),
        }
    }
}
