//! Test data builders for probability vectors and batch requests.

use comment_ai::models::{BatchComment, BatchRequest, RawLabel, RawProbabilityVector};

/// Fluent builder for raw probability vectors; unset labels are 0.
#[derive(Default)]
pub struct VectorBuilder {
    vector: Option<RawProbabilityVector>,
}

impl VectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one label's probability.
    pub fn set(mut self, label: RawLabel, value: f64) -> Self {
        let current = self.vector.unwrap_or_else(RawProbabilityVector::zeros);
        self.vector = Some(current.with(label, value).expect("probability in [0, 1]"));
        self
    }

    pub fn build(self) -> RawProbabilityVector {
        self.vector.unwrap_or_else(RawProbabilityVector::zeros)
    }
}

/// Vector with a single strong label.
pub fn one_hot(label: RawLabel) -> RawProbabilityVector {
    VectorBuilder::new().set(label, 0.9).build()
}

/// Batch request from `(id, text)` pairs; `None` ids are generated.
pub fn request(items: &[(Option<&str>, &str)]) -> BatchRequest {
    BatchRequest::new(
        items
            .iter()
            .map(|(id, text)| match id {
                Some(id) => BatchComment::with_id(*id, *text),
                None => BatchComment::new(*text),
            })
            .collect(),
    )
}
