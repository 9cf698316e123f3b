//! Batch orchestration: classify many comments with bounded fan-out.
//!
//! Items are independent, so they are streamed through the classifier with
//! up to `concurrency` predictions in flight. `buffered` keeps input order,
//! and results are folded into the response on a single task, so a
//! duplicate id always resolves to the later item.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::batch::{round3, BatchRequest, BatchResponse, CommentVerdict};
use crate::services::classifier::CommentClassifier;
use crate::services::progress::{noop_progress, ProgressReporter};
use crate::CommentAiError;

/// What to do when the oracle fails for one comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole batch with the first error.
    #[default]
    Abort,
    /// Drop the item from `comments` and record it under `errors`.
    Isolate,
}

/// Worker count defaulting to the available parallelism.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Max predictions in flight; 1 classifies sequentially.
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

pub struct BatchOrchestrator {
    classifier: Arc<CommentClassifier>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(classifier: Arc<CommentClassifier>, config: BatchConfig) -> Self {
        Self { classifier, config }
    }

    /// Classify every comment in the request.
    pub async fn analyze(&self, request: BatchRequest) -> Result<BatchResponse, CommentAiError> {
        self.analyze_with_progress(request, noop_progress()).await
    }

    /// Classify every comment, reporting after each one completes.
    ///
    /// The request is validated before any prediction runs. Comments without
    /// an id get a fresh UUID v4.
    pub async fn analyze_with_progress(
        &self,
        request: BatchRequest,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<BatchResponse, CommentAiError> {
        request.validate()?;

        let amount = request.comments.len();
        let start = Instant::now();

        let items: Vec<(String, String)> = request
            .comments
            .into_iter()
            .map(|comment| {
                let id = comment.id.unwrap_or_else(|| Uuid::new_v4().to_string());
                (id, comment.text.unwrap_or_default())
            })
            .collect();

        let classifier = self.classifier.clone();
        let mut outcomes = tokio_stream::iter(items)
            .map(move |(id, text)| {
                let classifier = classifier.clone();
                async move {
                    let result = classifier.classify(&text).await;
                    (id, text, result)
                }
            })
            .buffered(self.config.concurrency.max(1));

        let mut response = BatchResponse {
            amount,
            ..Default::default()
        };
        let mut done = 0usize;

        while let Some((id, text, result)) = outcomes.next().await {
            done += 1;
            match result {
                Ok(result) => {
                    response.errors.remove(&id);
                    let verdict = CommentVerdict::from_result(text, &result);
                    if response.comments.insert(id.clone(), verdict).is_some() {
                        debug!(id = %id, "duplicate comment id, keeping the later item");
                    }
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        warn!(id = %id, "Comment classification failed, aborting batch: {}", e);
                        return Err(e);
                    }
                    FailurePolicy::Isolate => {
                        warn!(id = %id, "Comment classification failed: {}", e);
                        response.comments.remove(&id);
                        response.errors.insert(id, e.to_string());
                    }
                },
            }
            progress
                .items(done, amount, &format!("Classified {}/{} comments", done, amount))
                .await;
        }

        response.elapsed_ms = round3(start.elapsed().as_secs_f64() * 1000.0);

        info!(
            amount = response.amount,
            classified = response.comments.len(),
            failed = response.errors.len(),
            elapsed_ms = response.elapsed_ms,
            "Batch classified"
        );

        Ok(response)
    }
}
