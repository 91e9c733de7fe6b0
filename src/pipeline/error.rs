use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::scoring::ScoringError;
use crate::variants::VariantError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RerankError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("insufficient context: the transcript has no user or agent turns")]
    InsufficientContext,

    #[error("encoder model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("embedding dimension mismatch: context has {expected}, candidate has {actual}")]
    EmbeddingDimensionMismatch { expected: usize, actual: usize },
}

impl RerankError {
    /// Whether a caller may safely answer with the canonical reply instead.
    ///
    /// Bad input and inconsistent model output are never masked.
    pub fn allows_canonical_fallback(&self) -> bool {
        matches!(
            self,
            RerankError::InsufficientContext | RerankError::ModelUnavailable { .. }
        )
    }

    /// Stable snake_case label, used in logs and HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RerankError::InvalidInput { .. } => "invalid_input",
            RerankError::InsufficientContext => "insufficient_context",
            RerankError::ModelUnavailable { .. } => "model_unavailable",
            RerankError::EmbeddingDimensionMismatch { .. } => "embedding_dimension_mismatch",
        }
    }
}

impl From<VariantError> for RerankError {
    fn from(err: VariantError) -> Self {
        RerankError::InvalidInput {
            reason: err.to_string(),
        }
    }
}

impl From<ScoringError> for RerankError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::DimensionMismatch {
                expected, actual, ..
            } => RerankError::EmbeddingDimensionMismatch { expected, actual },
        }
    }
}

impl From<EmbeddingError> for RerankError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::InsufficientContext => RerankError::InsufficientContext,
            EmbeddingError::DimensionMismatch { expected, actual } => {
                RerankError::EmbeddingDimensionMismatch { expected, actual }
            }
            other @ (EmbeddingError::ModelNotFound { .. }
            | EmbeddingError::ModelLoadFailed { .. }
            | EmbeddingError::DownloadFailed { .. }
            | EmbeddingError::DeviceUnavailable { .. }
            | EmbeddingError::InferenceFailed { .. }
            | EmbeddingError::TokenizationFailed { .. }
            | EmbeddingError::InvalidConfig { .. }) => RerankError::ModelUnavailable {
                reason: other.to_string(),
            },
        }
    }
}
