use std::sync::Arc;

use tracing::debug;

use crate::constants::EXTRA_CONTEXT_SEPARATOR;
use crate::embedding::error::EmbeddingError;

/// A dense vector in the shared context/response space.
pub type Embedding = Vec<f32>;

/// Context split into the immediate turn and the flattened earlier turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInput<'a> {
    /// The most recent turn.
    pub context: &'a str,
    /// Earlier turns, most recent first, joined with a single space.
    pub extra_context: String,
}

/// Splits a chronological history into [`ContextInput`].
///
/// `["hi", "hello", "I need help"]` becomes context `"I need help"` with extra
/// context `"hello hi"`.
pub fn split_context(history: &[String]) -> Result<ContextInput<'_>, EmbeddingError> {
    let (context, earlier) = history
        .split_last()
        .ok_or(EmbeddingError::InsufficientContext)?;

    let extra_context = earlier
        .iter()
        .rev()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(EXTRA_CONTEXT_SEPARATOR);

    Ok(ContextInput {
        context: context.as_str(),
        extra_context,
    })
}

/// Two-tower text encoder: one mapping for dialogue context, one for responses.
///
/// Implementations must return vectors of one fixed dimension for both towers.
pub trait DualEncoder: Send + Sync {
    /// Encodes the immediate context plus the flattened earlier turns.
    fn encode_context_pair(
        &self,
        context: &str,
        extra_context: &str,
    ) -> Result<Embedding, EmbeddingError>;

    /// Encodes each response; output order matches `texts`.
    fn encode_responses(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Output dimension, if already known (lazy backends report `None` before loading).
    fn embedding_dim(&self) -> Option<usize>;

    /// Encodes a chronological dialogue history (see [`split_context`]).
    fn encode_context(&self, history: &[String]) -> Result<Embedding, EmbeddingError> {
        let input = split_context(history)?;
        self.encode_context_pair(input.context, &input.extra_context)
    }

    /// Forces any lazy initialization.
    fn warm_up(&self) -> Result<(), EmbeddingError> {
        Ok(())
    }

    /// `true` once the encoder can serve requests without initializing.
    fn is_ready(&self) -> bool {
        true
    }

    /// Short label for readiness reporting.
    fn mode(&self) -> &'static str {
        "model"
    }
}

impl<E: DualEncoder + ?Sized> DualEncoder for Arc<E> {
    fn encode_context_pair(
        &self,
        context: &str,
        extra_context: &str,
    ) -> Result<Embedding, EmbeddingError> {
        (**self).encode_context_pair(context, extra_context)
    }

    fn encode_responses(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        (**self).encode_responses(texts)
    }

    fn embedding_dim(&self) -> Option<usize> {
        (**self).embedding_dim()
    }

    fn encode_context(&self, history: &[String]) -> Result<Embedding, EmbeddingError> {
        (**self).encode_context(history)
    }

    fn warm_up(&self) -> Result<(), EmbeddingError> {
        (**self).warm_up()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn mode(&self) -> &'static str {
        (**self).mode()
    }
}

/// Encodes `texts` in chunks of `batch_size` and concatenates the results in order.
///
/// Every returned vector must share one dimension; a short batch or a differing
/// dimension is reported rather than padded.
pub fn encode_in_batches<E: DualEncoder + ?Sized>(
    encoder: &E,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Embedding>, EmbeddingError> {
    if batch_size == 0 {
        return Err(EmbeddingError::InvalidConfig {
            reason: "batch_size must be greater than zero".to_string(),
        });
    }

    let mut encoded: Vec<Embedding> = Vec::with_capacity(texts.len());
    for (batch_idx, batch) in texts.chunks(batch_size).enumerate() {
        let vectors = encoder.encode_responses(batch)?;
        if vectors.len() != batch.len() {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!(
                    "encoder returned {} vectors for a batch of {}",
                    vectors.len(),
                    batch.len()
                ),
            });
        }

        debug!(batch = batch_idx, size = batch.len(), "Encoded response batch");
        encoded.extend(vectors);
    }

    if let Some(first) = encoded.first() {
        let expected = first.len();
        if let Some(odd) = encoded.iter().find(|v| v.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: odd.len(),
            });
        }
    }

    Ok(encoded)
}
