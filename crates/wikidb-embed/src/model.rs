//! XLM-RoBERTa sentence embedder (BGE-M3 and e5-style checkpoints) on candle.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

use wikidb_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::encode_padded;

const DEFAULT_PAD_ID: u32 = 1;

pub struct XlmRobertaEmbedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    pad_id: u32,
    prefix: String,
}

impl XlmRobertaEmbedder {
    /// Load `tokenizer.json`, `config.json` and either `model.safetensors` or
    /// `pytorch_model.bin` from `model_dir`.
    pub fn load(model_dir: &Path, max_len: usize, prefix: &str) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("failed to load tokenizer from {}: {e}", tokenizer_path.display()))?;
        let pad_id = tokenizer.token_to_id("<pad>").unwrap_or(DEFAULT_PAD_ID);

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let config: XLMRobertaConfig = serde_json::from_str(&raw_config)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))?;

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        tracing::info!(dim, max_len, "embedding model ready");

        Ok(Self {
            model,
            tokenizer,
            device,
            dim: usize::try_from(dim)?,
            max_len,
            pad_id,
            prefix: prefix.to_string(),
        })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let input = format!("{}{text}", self.prefix);
        let (input_ids, attention_mask) =
            encode_padded(&self.tokenizer, &input, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = Tensor::zeros((1, self.max_len), DType::U32, &self.device)?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let embedding: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        tracing::trace!(elapsed_ms = start.elapsed().as_millis() as u64, "embedded prompt");
        Ok(embedding)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    let tensors = candle_core::pickle::read_all(&pickle)
        .with_context(|| format!("reading {}", pickle.display()))?;
    Ok(tensors.into_iter().collect())
}

impl Embedder for XlmRobertaEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed_one(text)).collect()
    }
}
