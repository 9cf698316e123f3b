//! Startup wiring shared by all CLI commands.

use std::sync::Arc;

use anyhow::Result;

use crate::config::AppConfig;
use crate::grouping::GroupingRegistry;
use crate::oracle::{LocalOracle, ProbabilityOracle};
use crate::services::{BatchOrchestrator, CommentClassifier};
use crate::CommentAiError;

/// Built-in schemes plus any from `groupings_file`.
pub fn load_registry(config: &AppConfig) -> Result<GroupingRegistry, CommentAiError> {
    match &config.groupings_file {
        Some(path) => GroupingRegistry::with_file(path),
        None => GroupingRegistry::builtin(),
    }
}

/// Application context holding the loaded configuration and services.
pub struct AppContext {
    pub config: AppConfig,
    pub registry: Arc<GroupingRegistry>,
    pub oracle: Arc<dyn ProbabilityOracle>,
    pub classifier: Arc<CommentClassifier>,
    pub orchestrator: Arc<BatchOrchestrator>,
}

impl AppContext {
    /// Load the local model, warm it up and wire the services.
    ///
    /// Grouping errors are reported before the model is touched.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let registry = Arc::new(load_registry(&config)?);
        registry.get(&config.grouping)?;

        tracing::info!("Initializing emotion classifier...");
        let oracle_config = config.oracle_config();
        // download and weight loading are blocking I/O
        let oracle =
            tokio::task::spawn_blocking(move || LocalOracle::new(&oracle_config)).await??;
        let oracle: Arc<dyn ProbabilityOracle> = Arc::new(oracle);

        if let Err(e) = oracle.warm_up(&config.warm_up_text).await {
            tracing::warn!("Warm-up inference failed: {}", e);
        }

        Ok(Self::wire(config, registry, oracle)?)
    }

    /// Wire the services around an existing oracle.
    ///
    /// Fails if the grouping file is invalid or the configured default
    /// grouping does not exist.
    pub fn with_oracle(
        config: AppConfig,
        oracle: Arc<dyn ProbabilityOracle>,
    ) -> Result<Self, CommentAiError> {
        let registry = Arc::new(load_registry(&config)?);
        Self::wire(config, registry, oracle)
    }

    fn wire(
        config: AppConfig,
        registry: Arc<GroupingRegistry>,
        oracle: Arc<dyn ProbabilityOracle>,
    ) -> Result<Self, CommentAiError> {
        tracing::debug!("Grouping schemes: {}", registry.names().join(", "));

        let classifier = Arc::new(CommentClassifier::new(
            oracle.clone(),
            registry.clone(),
            config.classifier_settings(),
        )?);
        let orchestrator = Arc::new(BatchOrchestrator::new(
            classifier.clone(),
            config.batch_config(),
        ));

        Ok(Self {
            config,
            registry,
            oracle,
            classifier,
            orchestrator,
        })
    }
}
