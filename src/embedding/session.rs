//! Lazily initialized, explicitly owned encoder session.
//!
//! The session is built on first use and reused until [`EncoderSession::refresh`]
//! or [`EncoderSession::release`]. Builds are serialized by a dedicated lock, so
//! concurrent first use builds exactly one session. The slot itself is only locked
//! for reads and swaps, so readiness probes never wait on a load in progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::encoder::{DualEncoder, Embedding};
use super::error::EmbeddingError;

/// Builds the expensive encoder behind an [`EncoderSession`].
pub trait SessionLoader: Send + Sync {
    type Session: DualEncoder;

    fn load(&self) -> Result<Self::Session, EmbeddingError>;
}

pub struct EncoderSession<L: SessionLoader> {
    loader: L,
    slot: RwLock<Option<Arc<L::Session>>>,
    build_lock: Mutex<()>,
    loads: AtomicUsize,
}

impl<L: SessionLoader> std::fmt::Debug for EncoderSession<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderSession")
            .field("initialized", &self.is_initialized())
            .field("loads", &self.load_count())
            .finish_non_exhaustive()
    }
}

impl<L: SessionLoader> EncoderSession<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            slot: RwLock::new(None),
            build_lock: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Returns the live session, building it first if needed.
    pub fn get(&self) -> Result<Arc<L::Session>, EmbeddingError> {
        if let Some(session) = self.current() {
            return Ok(session);
        }

        let _build = self.build_lock.lock();
        if let Some(session) = self.current() {
            return Ok(session);
        }

        let session = Arc::new(self.build()?);
        *self.slot.write() = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Drops the current session (if any) and builds a new one.
    ///
    /// On failure the slot stays empty and the next call retries.
    pub fn refresh(&self) -> Result<(), EmbeddingError> {
        let _build = self.build_lock.lock();
        let previous = self.slot.write().take();
        if previous.is_some() {
            drop(previous);
            debug!("Released previous encoder session");
        }

        let session = Arc::new(self.build()?);
        *self.slot.write() = Some(session);
        Ok(())
    }

    /// Drops the current session. In-flight calls keep their `Arc` until they finish.
    pub fn release(&self) {
        let _build = self.build_lock.lock();
        let previous = self.slot.write().take();
        if previous.is_some() {
            debug!("Encoder session released");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// True while a build, refresh or release holds the build lock.
    pub fn is_loading(&self) -> bool {
        self.build_lock.is_locked()
    }

    /// Number of sessions built over this value's lifetime.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Acquire)
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    fn current(&self) -> Option<Arc<L::Session>> {
        self.slot.read().as_ref().map(Arc::clone)
    }

    fn build(&self) -> Result<L::Session, EmbeddingError> {
        let started = Instant::now();
        let session = self.loader.load()?;
        self.loads.fetch_add(1, Ordering::AcqRel);

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            embedding_dim = session.embedding_dim(),
            "Encoder session initialized"
        );

        Ok(session)
    }
}

impl<L: SessionLoader> DualEncoder for EncoderSession<L> {
    fn encode_context_pair(
        &self,
        context: &str,
        extra_context: &str,
    ) -> Result<Embedding, EmbeddingError> {
        self.get()?.encode_context_pair(context, extra_context)
    }

    fn encode_responses(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.get()?.encode_responses(texts)
    }

    fn embedding_dim(&self) -> Option<usize> {
        self.slot
            .read()
            .as_ref()
            .and_then(|session| session.embedding_dim())
    }

    fn warm_up(&self) -> Result<(), EmbeddingError> {
        self.get().map(|_| ())
    }

    fn is_ready(&self) -> bool {
        self.is_initialized()
    }

    fn mode(&self) -> &'static str {
        "model"
    }
}
