//! Local oracle backed by the candle sequence classifier.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::label::{RawLabel, RawProbabilityVector, RAW_LABEL_COUNT};
use crate::oracle::candle_backend::{select_device, ModelFiles, SequenceClassifier};
use crate::oracle::preprocess::preprocess;
use crate::oracle::ProbabilityOracle;
use crate::CommentAiError;

/// Default GoEmotions checkpoint on the HuggingFace Hub.
pub const DEFAULT_MODEL_REPO: &str = "SamLowe/roberta-base-go_emotions";

/// Where to load the classifier from.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// HuggingFace Hub repository id
    pub model_repo: String,
    /// Local directory with config.json, tokenizer.json and model.safetensors;
    /// takes precedence over `model_repo`
    pub model_dir: Option<PathBuf>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model_repo: DEFAULT_MODEL_REPO.to_string(),
            model_dir: None,
        }
    }
}

/// Local probability oracle using a candle multi-label classifier.
pub struct LocalOracle {
    classifier: Option<Arc<SequenceClassifier>>,
    /// Raw label for each model output index
    label_order: Vec<RawLabel>,
}

impl LocalOracle {
    /// Load the classifier.
    ///
    /// If the model files cannot be fetched or loaded the oracle is created
    /// unavailable (every prediction fails). A model whose labels are not
    /// exactly the 28 raw labels is a configuration error.
    pub fn new(config: &OracleConfig) -> Result<Self, CommentAiError> {
        let files = match &config.model_dir {
            Some(dir) => ModelFiles::from_dir(dir),
            None => ModelFiles::from_hub(&config.model_repo),
        };
        let files = match files {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    "Failed to fetch emotion model: {:#}. Classification will be unavailable.",
                    e
                );
                return Ok(Self::unavailable());
            }
        };

        let classifier = match SequenceClassifier::new(&files, select_device()) {
            Ok(classifier) => classifier,
            Err(e) => {
                warn!(
                    "Failed to load emotion model: {:#}. Classification will be unavailable.",
                    e
                );
                return Ok(Self::unavailable());
            }
        };

        let label_order = map_model_labels(classifier.labels())?;
        info!(
            "Emotion classifier loaded ({}, {} labels via candle)",
            config
                .model_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| config.model_repo.clone()),
            classifier.num_labels()
        );

        Ok(Self {
            classifier: Some(Arc::new(classifier)),
            label_order,
        })
    }

    fn unavailable() -> Self {
        Self {
            classifier: None,
            label_order: Vec::new(),
        }
    }
}

/// Map the model's `id2label` names onto the raw label set.
///
/// The model must emit each of the 28 raw labels exactly once, in any order.
pub fn map_model_labels(names: &[String]) -> Result<Vec<RawLabel>, CommentAiError> {
    let labels = names
        .iter()
        .map(|name| {
            name.parse::<RawLabel>().map_err(|_| {
                CommentAiError::Configuration(format!("Model emits unknown label '{}'", name))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let distinct: BTreeSet<RawLabel> = labels.iter().copied().collect();
    if labels.len() != RAW_LABEL_COUNT || distinct.len() != RAW_LABEL_COUNT {
        return Err(CommentAiError::Configuration(format!(
            "Model must emit each of the {} raw labels exactly once, got {} labels ({} distinct)",
            RAW_LABEL_COUNT,
            labels.len(),
            distinct.len()
        )));
    }
    Ok(labels)
}

/// Reorder one classifier row into a probability vector.
fn row_to_vector(
    label_order: &[RawLabel],
    row: &[f32],
) -> Result<RawProbabilityVector, CommentAiError> {
    if row.len() != label_order.len() {
        return Err(CommentAiError::oracle(format!(
            "Classifier returned {} scores for {} labels",
            row.len(),
            label_order.len()
        )));
    }
    RawProbabilityVector::from_pairs(
        label_order
            .iter()
            .copied()
            .zip(row.iter().map(|score| f64::from(*score))),
    )
    .map_err(|e| CommentAiError::Oracle {
        message: "Classifier returned an invalid probability vector".to_string(),
        source: Some(Box::new(e)),
    })
}

#[async_trait]
impl ProbabilityOracle for LocalOracle {
    async fn predict(&self, text: &str) -> Result<RawProbabilityVector, CommentAiError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| CommentAiError::oracle("Emotion model not loaded"))?
            .clone();

        let prepared = preprocess(text);

        let rows = tokio::task::spawn_blocking(move || classifier.classify(&[prepared]))
            .await
            .map_err(|e| CommentAiError::Oracle {
                message: "Inference task failed".to_string(),
                source: Some(Box::new(e)),
            })??;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| CommentAiError::oracle("Empty classification result"))?;

        row_to_vector(&self.label_order, &row)
    }

    async fn warm_up(&self, text: &str) -> Result<(), CommentAiError> {
        if !self.is_available() {
            return Ok(());
        }
        let start = std::time::Instant::now();
        self.predict(text).await?;
        info!(
            "Emotion classifier warmed up in {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.classifier.is_some()
    }
}
