use std::time::Duration;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_ENCODE_TIMEOUT, DEFAULT_LOAD_TIMEOUT, DEFAULT_MODIFIERS,
};

use super::error::RerankError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Settings for [`RerankingPipeline`](super::RerankingPipeline).
pub struct PipelineConfig {
    /// Prefix phrases, one variant each, in order.
    pub modifiers: Vec<String>,
    /// Responses per encoder call.
    pub batch_size: usize,
    /// Upper bound on lazy model initialization in the async path.
    pub load_timeout: Duration,
    /// Upper bound on each encoder call in the async path.
    pub encode_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            modifiers: DEFAULT_MODIFIERS.iter().map(|m| m.to_string()).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            encode_timeout: DEFAULT_ENCODE_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn with_encode_timeout(mut self, timeout: Duration) -> Self {
        self.encode_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), RerankError> {
        if self.batch_size == 0 {
            return Err(RerankError::InvalidInput {
                reason: "batch_size must be greater than zero".to_string(),
            });
        }

        if let Some(idx) = self.modifiers.iter().position(|m| m.trim().is_empty()) {
            return Err(RerankError::InvalidInput {
                reason: format!("modifier {} is blank", idx + 1),
            });
        }

        if self.load_timeout.is_zero() || self.encode_timeout.is_zero() {
            return Err(RerankError::InvalidInput {
                reason: "timeouts must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
