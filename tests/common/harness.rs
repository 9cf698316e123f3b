//! Service wiring around a static oracle.

use std::sync::Arc;

use comment_ai::grouping::GroupingRegistry;
use comment_ai::oracle::StaticOracle;
use comment_ai::services::{
    BatchConfig, BatchOrchestrator, ClassifierSettings, CommentClassifier, FailurePolicy,
};

pub fn registry() -> Arc<GroupingRegistry> {
    Arc::new(GroupingRegistry::builtin().expect("built-in schemes are valid"))
}

/// Classifier on the default scheme `a` and threshold.
pub fn classifier(oracle: Arc<StaticOracle>) -> Arc<CommentClassifier> {
    Arc::new(
        CommentClassifier::new(oracle, registry(), ClassifierSettings::default())
            .expect("default grouping exists"),
    )
}

pub fn orchestrator(
    oracle: Arc<StaticOracle>,
    failure_policy: FailurePolicy,
    concurrency: usize,
) -> BatchOrchestrator {
    BatchOrchestrator::new(
        classifier(oracle),
        BatchConfig {
            concurrency,
            failure_policy,
        },
    )
}
