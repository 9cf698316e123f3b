//! Comment classification: oracle → aggregation → corrections → result.

use std::sync::Arc;

use tracing::debug;

use crate::grouping::{GroupingRegistry, GroupingScheme, DEFAULT_GROUPING};
use crate::models::category::{EmotionCategory, SentimentCategory};
use crate::models::classification::{
    ClassificationDetail, ClassificationResult, RankedCategoryList, RawSummary,
};
use crate::models::label::RawProbabilityVector;
use crate::oracle::ProbabilityOracle;
use crate::services::aggregator::{aggregate_scheme, summarize_raw};
use crate::services::correction::{apply_corrections, CorrectionOutcome, NeutralDecrease};
use crate::CommentAiError;

/// Classify an already-predicted vector. Pure and deterministic.
pub fn classify_vector(
    vector: RawProbabilityVector,
    scheme: &GroupingScheme,
    neutral_decrease: NeutralDecrease,
) -> ClassificationResult {
    let (emotions, sentiments) = aggregate_scheme(&vector, scheme);
    let outcome = apply_corrections(&emotions, &sentiments, neutral_decrease);
    build_result(scheme, vector, emotions, sentiments, outcome)
}

/// Assemble the final result from the computed pieces.
pub fn build_result(
    scheme: &GroupingScheme,
    vector: RawProbabilityVector,
    emotions: RankedCategoryList<EmotionCategory>,
    sentiments: RankedCategoryList<SentimentCategory>,
    outcome: CorrectionOutcome,
) -> ClassificationResult {
    ClassificationResult {
        emotion: outcome.emotion,
        sentiment: outcome.sentiment,
        raw_emotion: vector.top_label(),
        information: ClassificationDetail {
            grouping: scheme.name().to_string(),
            emotions,
            sentiments,
            raw_emotions: vector,
            correction: outcome.corrections,
        },
    }
}

/// Default scheme and threshold for a [`CommentClassifier`].
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub grouping: String,
    pub neutral_decrease: NeutralDecrease,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            grouping: DEFAULT_GROUPING.to_string(),
            neutral_decrease: NeutralDecrease::default(),
        }
    }
}

/// Per-call overrides of the classifier defaults.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    pub grouping: Option<String>,
    pub neutral_decrease: Option<NeutralDecrease>,
}

/// Classifies comment text with a probability oracle and a grouping scheme.
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct CommentClassifier {
    oracle: Arc<dyn ProbabilityOracle>,
    registry: Arc<GroupingRegistry>,
    scheme: Arc<GroupingScheme>,
    neutral_decrease: NeutralDecrease,
}

impl CommentClassifier {
    /// Build a classifier. Fails if the default grouping does not exist.
    pub fn new(
        oracle: Arc<dyn ProbabilityOracle>,
        registry: Arc<GroupingRegistry>,
        settings: ClassifierSettings,
    ) -> Result<Self, CommentAiError> {
        let scheme = registry.get(&settings.grouping)?;
        Ok(Self {
            oracle,
            registry,
            scheme,
            neutral_decrease: settings.neutral_decrease,
        })
    }

    pub fn scheme(&self) -> &GroupingScheme {
        &self.scheme
    }

    /// Classify one text with the default scheme and threshold.
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult, CommentAiError> {
        let vector = self.oracle.predict(text).await?;
        Ok(self.classify_vector(vector))
    }

    /// Classify one text with per-call overrides.
    pub async fn classify_with(
        &self,
        text: &str,
        options: &ClassifyOptions,
    ) -> Result<ClassificationResult, CommentAiError> {
        let scheme = match &options.grouping {
            Some(name) => self.registry.get(name)?,
            None => self.scheme.clone(),
        };
        let neutral_decrease = options.neutral_decrease.unwrap_or(self.neutral_decrease);
        let vector = self.oracle.predict(text).await?;
        Ok(classify_vector(vector, &scheme, neutral_decrease))
    }

    /// Classify a vector with the default scheme and threshold.
    pub fn classify_vector(&self, vector: RawProbabilityVector) -> ClassificationResult {
        let result = classify_vector(vector, &self.scheme, self.neutral_decrease);
        if !result.information.correction.is_empty() {
            debug!(
                emotion = %result.emotion,
                sentiment = %result.sentiment,
                corrections = result.information.correction.len(),
                "corrections applied"
            );
        }
        result
    }

    /// Thresholded view of a raw prediction over the default scheme.
    pub fn summarize(&self, vector: &RawProbabilityVector, threshold: f64) -> RawSummary {
        summarize_raw(vector, &self.scheme, threshold)
    }
}
