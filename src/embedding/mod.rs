//! Dual encoder adapter.
//!
//! - [`DualEncoder`] is the text-in / vector-out contract the pipeline depends on.
//! - [`DialogueEncoder`] is the production implementation (lazy BERT session or stub).
//! - [`encode_in_batches`] chunks response encoding without changing the result.

/// Model artifact lookup and download.
pub mod assets;
/// BERT towers with mean pooling.
pub mod bert;
/// Encoder configuration.
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod dialogue;
/// The [`DualEncoder`] trait and batching.
pub mod encoder;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Lazily initialized session holder.
pub mod session;
mod stub;
/// Tokenizer loading helpers.
pub mod utils;


pub use bert::BertDualEncoder;
pub use config::EncoderConfig;
pub use dialogue::{BertSessionLoader, DialogueEncoder};
pub use encoder::{ContextInput, DualEncoder, Embedding, encode_in_batches, split_context};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockDualEncoder, MockFailure};
pub use session::{EncoderSession, SessionLoader};
pub use stub::StubDualEncoder;
