use tracing::debug;

use super::encoder::{DualEncoder, Embedding};
use super::error::EmbeddingError;

/// Deterministic encoder for tests and model-less development.
///
/// Vectors are seeded from a BLAKE3 hash of the input, so they are stable across
/// processes and platforms. Context and response towers hash under different
/// domains, mirroring a real dual encoder's separate mappings.
#[derive(Debug, Clone)]
pub struct StubDualEncoder {
    dim: usize,
}

impl StubDualEncoder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn hashed_vector(&self, domain: &str, parts: &[&str]) -> Embedding {
        let mut hasher = blake3::Hasher::new();
        hasher.update(domain.as_bytes());
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        let digest = hasher.finalize();

        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest.as_bytes()[..8]);
        let mut state = u64::from_le_bytes(seed);

        let mut embedding: Embedding = (0..self.dim)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }

        embedding
    }
}

impl DualEncoder for StubDualEncoder {
    fn encode_context_pair(
        &self,
        context: &str,
        extra_context: &str,
    ) -> Result<Embedding, EmbeddingError> {
        debug!(
            context_len = context.len(),
            extra_len = extra_context.len(),
            "Generating stub context embedding"
        );
        Ok(self.hashed_vector("context", &[context, extra_context]))
    }

    fn encode_responses(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|text| self.hashed_vector("response", &[text]))
            .collect())
    }

    fn embedding_dim(&self) -> Option<usize> {
        Some(self.dim)
    }

    fn mode(&self) -> &'static str {
        "stub"
    }
}
