use tracing::{debug, warn};

use super::assets::resolve_model_dir;
use super::bert::BertDualEncoder;
use super::config::EncoderConfig;
use super::device::select_device;
use super::encoder::{DualEncoder, Embedding};
use super::error::EmbeddingError;
use super::session::{EncoderSession, SessionLoader};
use super::stub::StubDualEncoder;

/// Loads a [`BertDualEncoder`] from an [`EncoderConfig`], downloading artifacts if needed.
#[derive(Debug, Clone)]
pub struct BertSessionLoader {
    config: EncoderConfig,
}

impl BertSessionLoader {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl SessionLoader for BertSessionLoader {
    type Session = BertDualEncoder;

    fn load(&self) -> Result<BertDualEncoder, EmbeddingError> {
        let model_dir = resolve_model_dir(&self.config)?;
        let device = select_device(self.config.force_cpu)?;
        debug!(?device, "Selected compute device for dual encoder");

        BertDualEncoder::load(&model_dir, &device, self.config.max_seq_len)
    }
}

enum EncoderBackend {
    Model(EncoderSession<BertSessionLoader>),
    Stub(StubDualEncoder),
}

/// The production encoder: a lazily loaded BERT dual encoder, or a deterministic stub.
///
/// Construction only validates the config; the model is loaded on first use (or
/// [`DualEncoder::warm_up`]) and kept until [`DialogueEncoder::refresh`].
pub struct DialogueEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for DialogueEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model(session) => format!("{:?}", session),
                    EncoderBackend::Stub(stub) => format!("Stub(dim={})", stub.dim()),
                },
            )
            .field("model_dir", &self.config.model_dir)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl DialogueEncoder {
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let backend = if config.testing_stub {
            warn!("Dual encoder running in STUB mode (testing only)");
            EncoderBackend::Stub(StubDualEncoder::new(config.stub_dim))
        } else {
            debug!(
                model_dir = %config.model_dir.display(),
                model_url = config.model_url.as_deref().unwrap_or("-"),
                "Dual encoder configured; model loads on first use"
            );
            EncoderBackend::Model(EncoderSession::new(BertSessionLoader::new(config.clone())))
        };

        Ok(Self { backend, config })
    }

    pub fn stub() -> Self {
        let config = EncoderConfig::stub();
        Self {
            backend: EncoderBackend::Stub(StubDualEncoder::new(config.stub_dim)),
            config,
        }
    }

    /// Drops the loaded model (if any) and loads it again.
    pub fn refresh(&self) -> Result<(), EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model(session) => session.refresh(),
            EncoderBackend::Stub(_) => Ok(()),
        }
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub(_))
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn active(&self) -> &dyn DualEncoder {
        match &self.backend {
            EncoderBackend::Model(session) => session,
            EncoderBackend::Stub(stub) => stub,
        }
    }
}

impl DualEncoder for DialogueEncoder {
    fn encode_context_pair(
        &self,
        context: &str,
        extra_context: &str,
    ) -> Result<Embedding, EmbeddingError> {
        self.active().encode_context_pair(context, extra_context)
    }

    fn encode_responses(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.active().encode_responses(texts)
    }

    fn embedding_dim(&self) -> Option<usize> {
        self.active().embedding_dim()
    }

    fn warm_up(&self) -> Result<(), EmbeddingError> {
        self.active().warm_up()
    }

    fn is_ready(&self) -> bool {
        self.active().is_ready()
    }

    fn mode(&self) -> &'static str {
        self.active().mode()
    }
}
