//! End-to-end reranking: variants, history, encoding, scoring.
//!
//! [`RerankingPipeline`] owns an injected [`DualEncoder`] and runs, per request:
//!
//! 1. generate the reply variants (canonical first),
//! 2. extract the user/agent history from the transcript,
//! 3. encode every variant in fixed-size batches, then the context,
//! 4. rank by dot product and return the head.
//!
//! An empty history fails with [`RerankError::InsufficientContext`] before the
//! encoder is touched. The async entry points run encoder work on tokio's blocking
//! pool under the configured timeouts; an elapsed timeout is reported as
//! [`RerankError::ModelUnavailable`]. The blocking thread itself is not cancelled.

pub mod config;
pub mod error;
pub mod types;


pub use config::PipelineConfig;
pub use error::RerankError;
pub use types::RerankedResponse;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::embedding::{DualEncoder, Embedding, EmbeddingError, encode_in_batches};
use crate::scoring::{RankedList, SimilarityRanker};
use crate::transcript::{Transcript, extract_history};
use crate::variants::{CandidateVariant, VariantGenerator};

pub struct RerankingPipeline<E: DualEncoder> {
    encoder: Arc<E>,
    generator: VariantGenerator,
    ranker: SimilarityRanker,
    config: PipelineConfig,
}

impl<E: DualEncoder> std::fmt::Debug for RerankingPipeline<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RerankingPipeline")
            .field("encoder_mode", &self.encoder.mode())
            .field("encoder_ready", &self.encoder.is_ready())
            .field("modifiers", &self.generator.modifiers().len())
            .field("batch_size", &self.config.batch_size)
            .finish()
    }
}

impl<E: DualEncoder> Clone for RerankingPipeline<E> {
    fn clone(&self) -> Self {
        Self {
            encoder: Arc::clone(&self.encoder),
            generator: self.generator.clone(),
            ranker: self.ranker,
            config: self.config.clone(),
        }
    }
}

impl<E: DualEncoder + 'static> RerankingPipeline<E> {
    pub fn new(encoder: Arc<E>, config: PipelineConfig) -> Result<Self, RerankError> {
        config.validate()?;

        Ok(Self {
            encoder,
            generator: VariantGenerator::new(config.modifiers.iter().cloned()),
            ranker: SimilarityRanker::new(),
            config,
        })
    }

    /// Pipeline with the default modifiers, batch size and timeouts.
    pub fn with_defaults(encoder: Arc<E>) -> Self {
        let config = PipelineConfig::default();
        Self {
            encoder,
            generator: VariantGenerator::new(config.modifiers.iter().cloned()),
            ranker: SimilarityRanker::new(),
            config,
        }
    }

    pub fn encoder(&self) -> &Arc<E> {
        &self.encoder
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn generator(&self) -> &VariantGenerator {
        &self.generator
    }

    /// Ranks every variant of `canonical` on the calling thread.
    pub fn rank_reply(
        &self,
        canonical: &str,
        transcript: &Transcript,
    ) -> Result<RankedList, RerankError> {
        let (variants, history) = self.prepare(canonical, transcript)?;

        let responses = encode_variants(self.encoder.as_ref(), &variants, self.config.batch_size)?;
        let context = self.encoder.encode_context(&history)?;

        self.finish(variants, responses, &context)
    }

    /// Async [`rank_reply`](Self::rank_reply): encoder work runs on the blocking pool.
    pub async fn rank_reply_async(
        &self,
        canonical: &str,
        transcript: &Transcript,
    ) -> Result<RankedList, RerankError> {
        let (variants, history) = self.prepare(canonical, transcript)?;

        if !self.encoder.is_ready() {
            self.warm_up().await?;
        }

        let encoder = Arc::clone(&self.encoder);
        let texts: Vec<String> = variants.iter().map(|v| v.text.clone()).collect();
        let batch_size = self.config.batch_size;
        let responses = self
            .run_blocking(self.config.encode_timeout, "encode_responses", move || {
                encode_in_batches(encoder.as_ref(), &texts, batch_size)
            })
            .await?;

        let encoder = Arc::clone(&self.encoder);
        let context = self
            .run_blocking(self.config.encode_timeout, "encode_context", move || {
                encoder.encode_context(&history)
            })
            .await?;

        self.finish(variants, responses, &context)
    }

    /// Ranks the variants and returns the chosen text with the full ranking.
    pub async fn rerank(
        &self,
        canonical: &str,
        transcript: &Transcript,
    ) -> Result<RerankedResponse, RerankError> {
        let ranked = self.rank_reply_async(canonical, transcript).await?;
        RerankedResponse::from_ranked(ranked).ok_or_else(|| RerankError::InvalidInput {
            reason: "no candidate variants were generated".to_string(),
        })
    }

    /// Like [`rerank`](Self::rerank), but answers with the canonical text when
    /// [`RerankError::allows_canonical_fallback`] holds.
    pub async fn rerank_or_canonical(
        &self,
        canonical: &str,
        transcript: &Transcript,
    ) -> Result<RerankedResponse, RerankError> {
        match self.rerank(canonical, transcript).await {
            Ok(response) => Ok(response),
            Err(err) if err.allows_canonical_fallback() => {
                warn!(kind = err.kind(), error = %err, "Reranking skipped; using canonical reply");
                Ok(RerankedResponse::canonical(canonical))
            }
            Err(err) => Err(err),
        }
    }

    /// Highest-scoring variant text.
    pub async fn select_best_reply(
        &self,
        canonical: &str,
        transcript: &Transcript,
    ) -> Result<String, RerankError> {
        self.rerank(canonical, transcript)
            .await
            .map(|response| response.text)
    }

    pub async fn select_best_reply_or_canonical(
        &self,
        canonical: &str,
        transcript: &Transcript,
    ) -> Result<String, RerankError> {
        self.rerank_or_canonical(canonical, transcript)
            .await
            .map(|response| response.text)
    }

    /// Initializes the encoder under the load timeout.
    pub async fn warm_up(&self) -> Result<(), RerankError> {
        let encoder = Arc::clone(&self.encoder);
        let started = Instant::now();
        self.run_blocking(self.config.load_timeout, "warm_up", move || encoder.warm_up())
            .await?;

        info!(
            mode = self.encoder.mode(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Encoder warmed up"
        );
        Ok(())
    }

    fn prepare(
        &self,
        canonical: &str,
        transcript: &Transcript,
    ) -> Result<(Vec<CandidateVariant>, Vec<String>), RerankError> {
        let variants = self.generator.generate_variants(canonical)?;
        let history = extract_history(transcript);
        if history.is_empty() {
            debug!(events = transcript.len(), "Transcript has no utterances");
            return Err(RerankError::InsufficientContext);
        }

        Ok((variants, history))
    }

    fn finish(
        &self,
        variants: Vec<CandidateVariant>,
        responses: Vec<Embedding>,
        context: &[f32],
    ) -> Result<RankedList, RerankError> {
        let candidates: Vec<_> = variants.into_iter().zip(responses).collect();
        let ranked = self.ranker.rank(candidates, context)?;

        if let Some(top) = ranked.top() {
            debug!(
                candidates = ranked.len(),
                top_origin = top.origin,
                top_score = top.score,
                "Reply reranked"
            );
        }
        Ok(ranked)
    }

    async fn run_blocking<T, F>(
        &self,
        limit: Duration,
        stage: &'static str,
        work: F,
    ) -> Result<T, RerankError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, EmbeddingError> + Send + 'static,
    {
        match tokio::time::timeout(limit, tokio::task::spawn_blocking(work)).await {
            Ok(Ok(result)) => result.map_err(RerankError::from),
            Ok(Err(join_err)) => Err(RerankError::ModelUnavailable {
                reason: format!("{stage} task failed: {join_err}"),
            }),
            Err(_) => {
                warn!(
                    stage,
                    timeout_ms = limit.as_millis() as u64,
                    "Encoder call timed out"
                );
                Err(RerankError::ModelUnavailable {
                    reason: format!("{stage} timed out after {}ms", limit.as_millis()),
                })
            }
        }
    }
}

fn encode_variants<E: DualEncoder + ?Sized>(
    encoder: &E,
    variants: &[CandidateVariant],
    batch_size: usize,
) -> Result<Vec<Embedding>, EmbeddingError> {
    let texts: Vec<String> = variants.iter().map(|v| v.text.clone()).collect();
    encode_in_batches(encoder, &texts, batch_size)
}
