//! Scriptable encoder for tests: fixed vectors, call counting, failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::encoder::{DualEncoder, Embedding};
use super::error::EmbeddingError;
use super::stub::StubDualEncoder;

/// Which call a [`MockDualEncoder`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Every call fails as if the model could not be loaded.
    LoadFailure,
    /// Response encoding fails with an inference error.
    ResponseInference,
}

/// Test encoder returning scripted vectors.
///
/// Responses without a scripted vector fall back to stub embeddings. The context
/// vector defaults to the stub context embedding.
#[derive(Debug)]
pub struct MockDualEncoder {
    dim: usize,
    context_vector: Option<Embedding>,
    response_vectors: HashMap<String, Embedding>,
    failure: Option<MockFailure>,
    delay: Option<Duration>,
    stub: StubDualEncoder,
    context_calls: AtomicUsize,
    response_calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
    context_inputs: Mutex<Vec<(String, String)>>,
}

impl MockDualEncoder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            context_vector: None,
            response_vectors: HashMap::new(),
            failure: None,
            delay: None,
            stub: StubDualEncoder::new(dim),
            context_calls: AtomicUsize::new(0),
            response_calls: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
            context_inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_context_vector(mut self, vector: Embedding) -> Self {
        self.context_vector = Some(vector);
        self
    }

    pub fn with_response_vector(mut self, text: impl Into<String>, vector: Embedding) -> Self {
        self.response_vectors.insert(text.into(), vector);
        self
    }

    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Sleeps this long inside every encode call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn context_calls(&self) -> usize {
        self.context_calls.load(Ordering::SeqCst)
    }

    pub fn response_calls(&self) -> usize {
        self.response_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.context_calls() + self.response_calls()
    }

    /// Sizes of every `encode_responses` call, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().clone()
    }

    /// `(context, extra_context)` of every context call, in call order.
    pub fn context_inputs(&self) -> Vec<(String, String)> {
        self.context_inputs.lock().clone()
    }

    fn pause(&self) {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
    }

    fn load_failure(&self) -> Result<(), EmbeddingError> {
        match self.failure {
            Some(MockFailure::LoadFailure) => Err(EmbeddingError::ModelLoadFailed {
                reason: "mock model unavailable".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl DualEncoder for MockDualEncoder {
    fn encode_context_pair(
        &self,
        context: &str,
        extra_context: &str,
    ) -> Result<Embedding, EmbeddingError> {
        self.context_calls.fetch_add(1, Ordering::SeqCst);
        self.context_inputs
            .lock()
            .push((context.to_string(), extra_context.to_string()));
        self.pause();
        self.load_failure()?;

        match &self.context_vector {
            Some(vector) => Ok(vector.clone()),
            None => self.stub.encode_context_pair(context, extra_context),
        }
    }

    fn encode_responses(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.response_calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().push(texts.len());
        self.pause();
        self.load_failure()?;

        if self.failure == Some(MockFailure::ResponseInference) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock inference failure".to_string(),
            });
        }

        texts
            .iter()
            .map(|text| match self.response_vectors.get(text) {
                Some(vector) => Ok(vector.clone()),
                None => Ok(self
                    .stub
                    .encode_responses(std::slice::from_ref(text))?
                    .remove(0)),
            })
            .collect()
    }

    fn embedding_dim(&self) -> Option<usize> {
        Some(self.dim)
    }

    fn warm_up(&self) -> Result<(), EmbeddingError> {
        self.pause();
        self.load_failure()
    }

    fn mode(&self) -> &'static str {
        "mock"
    }
}
