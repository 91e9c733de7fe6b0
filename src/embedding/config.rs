use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_MAX_SEQ_LEN, STUB_EMBEDDING_DIM};
use crate::embedding::error::EmbeddingError;

#[derive(Debug, Clone)]
/// Configuration for [`DialogueEncoder`](super::DialogueEncoder).
pub struct EncoderConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// Base URL the artifacts are fetched from when missing locally.
    pub model_url: Option<String>,
    /// Max tokens per sequence (context pairs are truncated longest-first).
    pub max_seq_len: usize,
    /// Output dimension in stub mode.
    pub stub_dim: usize,
    /// Skip GPU probing even when a GPU feature is compiled in.
    pub force_cpu: bool,
    pub download_timeout: Duration,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            model_url: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            stub_dim: STUB_EMBEDDING_DIM,
            force_cpu: false,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            testing_stub: false,
        }
    }
}

impl EncoderConfig {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_model_url(mut self, url: impl Into<String>) -> Self {
        self.model_url = Some(url.into());
        self
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn with_stub_dim(mut self, stub_dim: usize) -> Self {
        self.stub_dim = stub_dim;
        self
    }

    pub fn with_force_cpu(mut self, force_cpu: bool) -> Self {
        self.force_cpu = force_cpu;
        self
    }

    /// Checks the settings that can be verified without touching the model.
    ///
    /// A missing directory is fine when `model_url` is set; the artifacts are
    /// fetched on first use.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            if self.stub_dim == 0 {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "stub_dim must be greater than zero".to_string(),
                });
            }
            return Ok(());
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if let Some(url) = &self.model_url
            && url.trim().is_empty()
        {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_url cannot be empty when provided".to_string(),
            });
        }

        if self.model_url.is_none() && !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        Ok(())
    }
}
