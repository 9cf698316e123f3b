//! Probability oracle: text in, 28 independent label probabilities out.
//!
//! The [`ProbabilityOracle`] trait abstracts inference so the decision engine
//! never depends on a model runtime. [`LocalOracle`] runs a fine-tuned
//! multi-label transformer through candle; [`StaticOracle`] serves fixed
//! vectors for tests and dry runs.

pub mod candle_backend;
pub mod local;
pub mod preprocess;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::models::label::RawProbabilityVector;
use crate::CommentAiError;

pub use local::{LocalOracle, OracleConfig};

/// Text used for the start-up inference when none is configured.
pub const DEFAULT_WARM_UP_TEXT: &str = "I love writing code!";

/// Service trait for raw probability inference.
#[async_trait]
pub trait ProbabilityOracle: Send + Sync {
    /// Predict raw label probabilities for one text.
    async fn predict(&self, text: &str) -> Result<RawProbabilityVector, CommentAiError>;

    /// Run one throwaway inference so lazy initialization happens before
    /// the first real request.
    async fn warm_up(&self, text: &str) -> Result<(), CommentAiError> {
        self.predict(text).await.map(|_| ())
    }

    /// Whether the oracle can serve predictions.
    fn is_available(&self) -> bool;
}

/// No-op oracle for contexts without a model.
///
/// Always reports as unavailable and fails every prediction.
pub struct NoopOracle;

impl Default for NoopOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopOracle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProbabilityOracle for NoopOracle {
    async fn predict(&self, _text: &str) -> Result<RawProbabilityVector, CommentAiError> {
        Err(CommentAiError::oracle("Probability oracle is not available (noop)"))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Oracle answering from a fixed text → vector table.
///
/// Texts not in the table get the fallback vector, or an oracle error when
/// there is none. Counts calls so tests can assert how often inference ran.
#[derive(Default)]
pub struct StaticOracle {
    table: HashMap<String, RawProbabilityVector>,
    fallback: Option<RawProbabilityVector>,
    calls: AtomicUsize,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every unknown text with `vector`.
    pub fn with_fallback(mut self, vector: RawProbabilityVector) -> Self {
        self.fallback = Some(vector);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>, vector: RawProbabilityVector) -> Self {
        self.table.insert(text.into(), vector);
        self
    }

    /// Number of `predict` calls served or refused so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ProbabilityOracle for StaticOracle {
    async fn predict(&self, text: &str) -> Result<RawProbabilityVector, CommentAiError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.table
            .get(text)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| CommentAiError::oracle(format!("No prediction for text '{}'", text)))
    }

    fn is_available(&self) -> bool {
        true
    }
}
