//! Candle-based inference backend for the multi-label emotion classifier.
//!
//! Pure-Rust ML runtime using candle with Metal GPU acceleration on macOS.
//! Provides [`SequenceClassifier`], a transformer with a sequence
//! classification head and independent sigmoid outputs, for BERT and
//! (XLM-)RoBERTa checkpoints.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{LayerNorm, Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as XLMRobertaConfig, XLMRobertaForSequenceClassification,
};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Maximum tokens per comment; longer inputs are truncated.
pub const MAX_SEQUENCE_LENGTH: usize = 128;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Paths to the classifier's config, tokenizer and weights.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub weights_path: PathBuf,
}

impl ModelFiles {
    /// Model files laid out in a local directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::resolve(|name| {
            let path = dir.join(name);
            if !path.exists() {
                anyhow::bail!("Model file not found: {}", path.display());
            }
            Ok(path)
        })
    }

    /// Model files from a HuggingFace Hub repository, cached under
    /// `~/.cache/huggingface/hub/`. Blocking; call from `spawn_blocking`.
    pub fn from_hub(repo_id: &str) -> Result<Self> {
        let api = hf_hub::api::sync::Api::new().context("Failed to initialize HuggingFace Hub API")?;
        let repo = api.model(repo_id.to_string());
        Self::resolve(|name| {
            repo.get(name)
                .with_context(|| format!("Failed to download {} from {}", name, repo_id))
        })
    }

    fn resolve(mut fetch: impl FnMut(&str) -> Result<PathBuf>) -> Result<Self> {
        Ok(Self {
            config_path: fetch(CONFIG_FILE)?,
            tokenizer_path: fetch(TOKENIZER_FILE)?,
            weights_path: fetch(WEIGHTS_FILE)?,
        })
    }
}

/// Pick the device to run the classifier on.
///
/// A GPU is used only if it runs layer-norm, which both encoders need.
/// Otherwise the CPU.
pub fn select_device() -> Device {
    let mut candidates = Vec::new();
    if cfg!(target_os = "macos") {
        candidates.push(("Metal", Device::new_metal(0)));
    }
    if cfg!(feature = "cuda") {
        candidates.push(("CUDA", Device::new_cuda(0)));
    }

    for (name, device) in candidates {
        let Ok(device) = device else { continue };
        if runs_layer_norm(&device) {
            tracing::info!("Running emotion classifier on {}", name);
            return device;
        }
        tracing::warn!("{} device lacks layer-norm support, skipping", name);
    }
    tracing::info!("Running emotion classifier on CPU");
    Device::Cpu
}

fn runs_layer_norm(device: &Device) -> bool {
    let run = || -> candle_core::Result<Tensor> {
        let ln = LayerNorm::new(
            Tensor::ones(4, DType::F32, device)?,
            Tensor::zeros(4, DType::F32, device)?,
            1e-5,
        );
        ln.forward(&Tensor::ones((1, 4), DType::F32, device)?)
    };
    run().is_ok()
}

/// BERT encoder with the pooler + linear head of `BertForSequenceClassification`.
struct BertSequenceHead {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
}

impl BertSequenceHead {
    fn forward(
        &self,
        input_ids: &Tensor,
        attention_mask: &Tensor,
        token_type_ids: &Tensor,
    ) -> candle_core::Result<Tensor> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        // [CLS] token -> pooler -> tanh -> classifier
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        self.classifier.forward(&pooled)
    }
}

enum ClassifierModel {
    Bert(BertSequenceHead),
    XlmRoberta(XLMRobertaForSequenceClassification),
}

/// Multi-label sequence classifier.
///
/// Classifies text into multiple labels with independent sigmoid activations.
/// The architecture is chosen from `model_type` in config.json: `bert`
/// checkpoints get a pooler + linear head, `roberta`/`xlm-roberta` use the
/// XLM-RoBERTa sequence classification model.
pub struct SequenceClassifier {
    model: ClassifierModel,
    tokenizer: Tokenizer,
    device: Device,
    labels: Vec<String>,
}

impl SequenceClassifier {
    /// Load a sequence classifier from model files.
    ///
    /// Parses `id2label` from config.json to determine label names and count.
    pub fn new(files: &ModelFiles, device: Device) -> Result<Self> {
        let config_str = std::fs::read_to_string(&files.config_path)
            .context("Failed to read classifier config")?;
        let config_json: serde_json::Value =
            serde_json::from_str(&config_str).context("Failed to parse config as JSON")?;

        let labels = parse_id2label(&config_json)?;
        let num_labels = labels.len();

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load classifier tokenizer: {}", e))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        // SAFETY: the mmap'd safetensors file must not be modified while the model
        // is in use.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, &device)
                .context("Failed to load classifier weights")?
        };

        let model_type = config_json
            .get("model_type")
            .and_then(|v| v.as_str())
            .unwrap_or("roberta");

        let model = match model_type {
            "bert" => {
                let config: BertConfig =
                    serde_json::from_str(&config_str).context("Failed to parse BERT config")?;
                let hidden_size = config_json
                    .get("hidden_size")
                    .and_then(|v| v.as_u64())
                    .context("config.json missing hidden_size")?
                    as usize;
                let bert = BertModel::load(vb.pp("bert"), &config)
                    .context("Failed to construct BERT model")?;
                let pooler = candle_nn::linear(hidden_size, hidden_size, vb.pp("bert.pooler.dense"))
                    .context("Failed to load BERT pooler")?;
                let classifier = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))
                    .context("Failed to load classification head")?;
                ClassifierModel::Bert(BertSequenceHead {
                    bert,
                    pooler,
                    classifier,
                })
            }
            "roberta" | "xlm-roberta" => {
                let config: XLMRobertaConfig = serde_json::from_str(&config_str)
                    .context("Failed to parse XLM-RoBERTa config")?;
                ClassifierModel::XlmRoberta(
                    XLMRobertaForSequenceClassification::new(num_labels, &config, vb)
                        .context("Failed to construct classifier model")?,
                )
            }
            other => anyhow::bail!("Unsupported classifier model_type '{}'", other),
        };

        Ok(Self {
            model,
            tokenizer,
            device,
            labels,
        })
    }

    /// Classify texts into multi-label scores.
    ///
    /// Returns one row per input text with a sigmoid-activated score (0..1)
    /// per label, in [`SequenceClassifier::labels`] order.
    pub fn classify(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let str_refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let encodings = self
            .tokenizer
            .encode_batch(str_refs, true)
            .map_err(|e| anyhow::anyhow!("Classifier tokenization failed: {}", e))?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let input_ids: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_ids().to_vec())
            .collect();
        let attention_mask: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_attention_mask().to_vec())
            .collect();
        let token_type_ids: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_type_ids().to_vec())
            .collect();

        let input_ids = Tensor::from_vec(input_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(attention_mask, (batch_size, max_len), &self.device)?;

        // Forward pass -> [batch, num_labels] logits
        let logits = match &self.model {
            ClassifierModel::Bert(head) => {
                let token_type_ids =
                    Tensor::from_vec(token_type_ids, (batch_size, max_len), &self.device)?;
                head.forward(&input_ids, &attention_mask, &token_type_ids)?
            }
            ClassifierModel::XlmRoberta(model) => {
                // XLM-RoBERTa ignores token types; pass zeros
                let token_type_ids = input_ids.zeros_like()?;
                model.forward(&input_ids, &attention_mask, &token_type_ids)?
            }
        };

        // Sigmoid for independent multi-label activations
        let scores = candle_nn::ops::sigmoid(&logits)?;
        scores
            .to_vec2::<f32>()
            .context("Failed to convert classifier scores to Vec")
    }

    /// Get the label names in index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Get the number of classification labels.
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }
}

/// Ordered label names from `id2label`: `{"0": "admiration", "1": "amusement", ...}`.
fn parse_id2label(config_json: &serde_json::Value) -> Result<Vec<String>> {
    let id2label = config_json
        .get("id2label")
        .and_then(|v| v.as_object())
        .context("config.json missing id2label mapping")?;

    let mut label_entries: Vec<(usize, String)> = id2label
        .iter()
        .filter_map(|(k, v)| {
            let idx: usize = k.parse().ok()?;
            let label = v.as_str()?.to_string();
            Some((idx, label))
        })
        .collect();
    label_entries.sort_by_key(|(idx, _)| *idx);

    if label_entries.is_empty() {
        anyhow::bail!("id2label is empty, cannot determine label count");
    }

    Ok(label_entries.into_iter().map(|(_, label)| label).collect())
}
