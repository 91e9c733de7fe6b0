//! Rerank library crate (used by the server and integration tests).
//!
//! Picks the best phrasing of a bot reply for the current conversation: the
//! canonical reply is expanded into modifier-prefixed variants, the dialogue
//! context and every variant are embedded with a dual encoder, and the variant
//! whose embedding has the highest dot product with the context wins.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`RerankingPipeline`], [`PipelineConfig`], [`RerankError`] - End-to-end ranking
//! - [`RerankedResponse`] - Chosen text plus the full ranking
//! - [`Config`], [`ConfigError`] - Server configuration
//!
//! ## Building Blocks
//! - [`VariantGenerator`], [`CandidateVariant`] - Reply variants
//! - [`Transcript`], [`Event`], [`extract_history`] - Conversation history
//! - [`DualEncoder`], [`DialogueEncoder`], [`EncoderConfig`] - Context/response embedding
//! - [`SimilarityRanker`], [`RankedList`], [`ScoredCandidate`] - Dot-product ranking
//!
//! ## Test/Mock Support
//! [`MockDualEncoder`] is available behind `#[cfg(any(test, feature = "mock"))]`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rerank::{Event, RerankingPipeline, StubDualEncoder, Transcript};
//!
//! let pipeline = RerankingPipeline::with_defaults(Arc::new(StubDualEncoder::new(64)));
//! let transcript = Transcript::from_events(vec![
//!     Event::user("hi"),
//!     Event::bot("hello"),
//!     Event::user("I need help"),
//! ]);
//!
//! let ranked = pipeline.rank_reply("I can help with that.", &transcript).unwrap();
//! assert_eq!(ranked.len(), 8);
//! ```

pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod pipeline;
pub mod scoring;
pub mod transcript;
pub mod variants;

pub use config::{Config, ConfigError};
pub use embedding::{
    DialogueEncoder, DualEncoder, Embedding, EmbeddingError, EncoderConfig, StubDualEncoder,
    encode_in_batches,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockDualEncoder, MockFailure};
pub use pipeline::{PipelineConfig, RerankError, RerankedResponse, RerankingPipeline};
pub use scoring::{RankedList, ScoredCandidate, ScoringError, SimilarityRanker};
pub use transcript::{Event, Speaker, Transcript, Turn, extract_history, extract_turns};
pub use variants::{CandidateVariant, VariantError, VariantGenerator, generate_variants};
