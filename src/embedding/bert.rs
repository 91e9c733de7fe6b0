use std::path::Path;

use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use parking_lot::Mutex;
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use super::assets::{CONFIG_FILE, WEIGHTS_FILE, response_tower_dir};
use super::encoder::{DualEncoder, Embedding};
use super::error::EmbeddingError;
use super::utils::load_tokenizer;

/// One BERT tower with attention-masked mean pooling.
pub struct BertTower {
    bert: BertModel,
    hidden_size: usize,
}

impl BertTower {
    pub fn load<P: AsRef<Path>>(tower_dir: P, device: &Device) -> Result<Self> {
        let tower_dir = tower_dir.as_ref();
        let config_content = std::fs::read_to_string(tower_dir.join(CONFIG_FILE))?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[tower_dir.join(WEIGHTS_FILE)], DType::F32, device)?
        };

        let bert = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &config)?
        } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("roberta"), &config)?
        } else {
            BertModel::load(vb, &config)?
        };

        Ok(Self {
            bert,
            hidden_size: config.hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Returns `[batch, hidden]` mean-pooled over unmasked tokens.
    pub fn encode(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;

        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9f32, f32::MAX)?;
        summed.broadcast_div(&counts)
    }
}

struct Towers {
    context: BertTower,
    /// `None` when both mappings share one set of weights.
    response: Option<BertTower>,
}

impl Towers {
    fn response(&self) -> &BertTower {
        self.response.as_ref().unwrap_or(&self.context)
    }
}

/// BERT dual encoder loaded from a model directory.
///
/// The context tower sees `(context, extra_context)` as a sentence pair; responses
/// are single sequences. A `response/` subdirectory, when present, supplies separate
/// response-tower weights.
pub struct BertDualEncoder {
    towers: Mutex<Towers>,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl std::fmt::Debug for BertDualEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertDualEncoder")
            .field("device", &format!("{:?}", self.device))
            .field("dim", &self.dim)
            .finish_non_exhaustive()
    }
}

impl BertDualEncoder {
    pub fn load(
        model_dir: &Path,
        device: &Device,
        max_seq_len: usize,
    ) -> std::result::Result<Self, EmbeddingError> {
        let context = BertTower::load(model_dir, device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load context tower: {}", e),
            }
        })?;

        let response = match response_tower_dir(model_dir) {
            Some(dir) => {
                let tower = BertTower::load(&dir, device).map_err(|e| {
                    EmbeddingError::ModelLoadFailed {
                        reason: format!("Failed to load response tower: {}", e),
                    }
                })?;
                if tower.hidden_size() != context.hidden_size() {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: context.hidden_size(),
                        actual: tower.hidden_size(),
                    });
                }
                Some(tower)
            }
            None => None,
        };

        let tokenizer = load_tokenizer(model_dir, max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        let dim = context.hidden_size();
        info!(
            model_dir = %model_dir.display(),
            dim,
            shared_towers = response.is_none(),
            "Dual encoder loaded"
        );

        Ok(Self {
            towers: Mutex::new(Towers { context, response }),
            tokenizer,
            device: device.clone(),
            dim,
        })
    }

    fn run_tower(
        &self,
        tower: &BertTower,
        encoding: &Encoding,
    ) -> std::result::Result<Embedding, EmbeddingError> {
        let to_input = |values: &[u32]| -> Result<Tensor> {
            Tensor::new(values, &self.device)?.unsqueeze(0)
        };

        let input_ids = to_input(encoding.get_ids())?;
        let type_ids = to_input(encoding.get_type_ids())?;
        let attention_mask = to_input(encoding.get_attention_mask())?;

        let pooled = tower
            .encode(&input_ids, &type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Transformer forward pass failed: {}", e),
            })?;

        let embedding = pooled.squeeze(0)?.to_vec1::<f32>()?;
        if embedding.len() != self.dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dim,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    fn tokenization_error(e: tokenizers::Error) -> EmbeddingError {
        EmbeddingError::TokenizationFailed {
            reason: e.to_string(),
        }
    }
}

impl DualEncoder for BertDualEncoder {
    fn encode_context_pair(
        &self,
        context: &str,
        extra_context: &str,
    ) -> std::result::Result<Embedding, EmbeddingError> {
        let encoding = if extra_context.is_empty() {
            self.tokenizer.encode(context, true)
        } else {
            self.tokenizer.encode((context, extra_context), true)
        }
        .map_err(Self::tokenization_error)?;

        debug!(
            token_count = encoding.get_ids().len(),
            "Encoding dialogue context"
        );

        let towers = self.towers.lock();
        self.run_tower(&towers.context, &encoding)
    }

    fn encode_responses(&self, texts: &[String]) -> std::result::Result<Vec<Embedding>, EmbeddingError> {
        let encodings = texts
            .iter()
            .map(|text| self.tokenizer.encode(text.as_str(), true))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Self::tokenization_error)?;

        // One forward pass per text: unpadded inputs keep results independent of
        // how callers chunk the batch.
        let towers = self.towers.lock();
        encodings
            .iter()
            .map(|encoding| self.run_tower(towers.response(), encoding))
            .collect()
    }

    fn embedding_dim(&self) -> Option<usize> {
        Some(self.dim)
    }
}
