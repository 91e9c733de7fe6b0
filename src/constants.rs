//! Cross-cutting, shared constants.
//!
//! Defaults for the env-backed [`Config`](crate::config::Config) live here so the
//! pipeline, the encoder and the gateway agree on them.

use std::time::Duration;

/// Modifier phrases prefixed to the canonical reply when no list is configured.
pub const DEFAULT_MODIFIERS: &[&str] = &[
    "Nevermind.",
    "Ok.",
    "Yes, that's right.",
    "Actually no.",
    "Whatever.",
    "I'll repeat.",
    "Again.",
];

/// Placed between a modifier phrase and the canonical reply.
pub const MODIFIER_SEPARATOR: &str = " ";

/// Joins earlier turns into the extra-context string.
pub const EXTRA_CONTEXT_SEPARATOR: &str = " ";

/// Responses are encoded in chunks of this many texts.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Max tokens fed to the encoder per sequence (pairs are truncated longest-first).
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Output dimension of the stub encoder (matches ConveRT-style 512-d encoders).
pub const STUB_EMBEDDING_DIM: usize = 512;

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_ENCODE_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Response header carrying the rerank outcome.
pub const RERANK_STATUS_HEADER: &str = "x-rerank-status";

pub const RERANK_STATUS_HEALTHY: &str = "healthy";
pub const RERANK_STATUS_READY: &str = "ready";
pub const RERANK_STATUS_PENDING: &str = "pending";
pub const RERANK_STATUS_RANKED: &str = "ranked";
pub const RERANK_STATUS_FALLBACK: &str = "fallback";
