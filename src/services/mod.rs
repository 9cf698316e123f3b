pub mod aggregator;
pub mod batch;
pub mod classifier;
pub mod correction;
pub mod progress;

pub use aggregator::{aggregate, aggregate_scheme, summarize_raw, RAW_SUMMARY_THRESHOLD};
pub use batch::{default_concurrency, BatchConfig, BatchOrchestrator, FailurePolicy};
pub use classifier::{
    build_result, classify_vector, ClassifierSettings, ClassifyOptions, CommentClassifier,
};
pub use correction::{
    apply_corrections, CorrectionOutcome, NeutralDecrease, DEFAULT_NEUTRAL_DECREASE,
};
pub use progress::{noop_progress, NoopProgressReporter, ProgressReporter};
