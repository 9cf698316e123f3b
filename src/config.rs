//! Application configuration.
//!
//! Resolved once at startup with this priority:
//! 1. explicit `--config` path
//! 2. `COMMENT_AI_CONFIG` env var path
//! 3. `{config_dir}/comment-ai/config.toml`
//! 4. defaults
//!
//! Command-line flags are applied on top with [`ConfigOverrides`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::grouping::DEFAULT_GROUPING;
use crate::oracle::local::DEFAULT_MODEL_REPO;
use crate::oracle::{OracleConfig, DEFAULT_WARM_UP_TEXT};
use crate::services::batch::{default_concurrency, BatchConfig, FailurePolicy};
use crate::services::classifier::ClassifierSettings;
use crate::services::correction::NeutralDecrease;
use crate::CommentAiError;

/// Env var naming a config file.
pub const CONFIG_ENV: &str = "COMMENT_AI_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// HuggingFace Hub repository of the 28-label model
    pub model_repo: String,
    /// Local model directory; overrides `model_repo`
    pub model_dir: Option<PathBuf>,
    /// Default grouping scheme
    pub grouping: String,
    pub neutral_decrease: NeutralDecrease,
    /// Max predictions in flight per batch
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
    /// Extra grouping schemes in TOML
    pub groupings_file: Option<PathBuf>,
    pub warm_up_text: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_repo: DEFAULT_MODEL_REPO.to_string(),
            model_dir: None,
            grouping: DEFAULT_GROUPING.to_string(),
            neutral_decrease: NeutralDecrease::default(),
            concurrency: default_concurrency(),
            failure_policy: FailurePolicy::default(),
            groupings_file: None,
            warm_up_text: DEFAULT_WARM_UP_TEXT.to_string(),
        }
    }
}

/// `{config_dir}/comment-ai/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("comment-ai").join("config.toml"))
}

/// Pick the config file to read, if any.
///
/// An explicit or env-provided path is returned even if missing so that
/// reading it reports the error; the default path only when it exists.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<String>,
    default_path: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(value));
    }
    default_path.filter(|path| path.exists())
}

impl AppConfig {
    /// Load with the standard priority.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CommentAiError> {
        let path = resolve_config_path(
            explicit,
            std::env::var(CONFIG_ENV).ok(),
            default_config_path(),
        );
        match path {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and validate a TOML config file. Any failure is fatal.
    pub fn from_file(path: &Path) -> Result<Self, CommentAiError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CommentAiError::Configuration(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::parse(&contents).map_err(|e| {
            CommentAiError::Configuration(format!("Invalid config {}: {}", path.display(), e))
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, CommentAiError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CommentAiError> {
        if self.concurrency == 0 {
            return Err(CommentAiError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.grouping.trim().is_empty() {
            return Err(CommentAiError::Configuration(
                "grouping must not be empty".to_string(),
            ));
        }
        if self.model_dir.is_none() && self.model_repo.trim().is_empty() {
            return Err(CommentAiError::Configuration(
                "either model_dir or model_repo must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, CommentAiError> {
        if let Some(grouping) = &overrides.grouping {
            self.grouping = grouping.clone();
        }
        if let Some(value) = overrides.neutral_decrease {
            self.neutral_decrease = NeutralDecrease::new(value)?;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.concurrency = concurrency;
        }
        if overrides.isolate_failures {
            self.failure_policy = FailurePolicy::Isolate;
        }
        if let Some(dir) = &overrides.model_dir {
            self.model_dir = Some(dir.clone());
        }
        self.validate()?;
        Ok(self)
    }

    pub fn oracle_config(&self) -> OracleConfig {
        OracleConfig {
            model_repo: self.model_repo.clone(),
            model_dir: self.model_dir.clone(),
        }
    }

    pub fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            grouping: self.grouping.clone(),
            neutral_decrease: self.neutral_decrease,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            concurrency: self.concurrency,
            failure_policy: self.failure_policy,
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub grouping: Option<String>,
    pub neutral_decrease: Option<f64>,
    pub concurrency: Option<usize>,
    pub isolate_failures: bool,
    pub model_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.grouping, "a");
        assert_eq!(config.neutral_decrease.value(), 0.1);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(config.concurrency >= 1);
    }

    #[test]
    fn test_parse_all_fields() {
        let config = AppConfig::parse(
            r#"
            model_dir = "/models/go-emotions"
            grouping = "b"
            neutral_decrease = 0.05
            concurrency = 2
            failure_policy = "isolate"
            groupings_file = "/etc/comment-ai/groupings.toml"
            warm_up_text = "hello"
            "#,
        )
        .unwrap();
        assert_eq!(config.model_dir, Some(PathBuf::from("/models/go-emotions")));
        assert_eq!(config.grouping, "b");
        assert_eq!(config.neutral_decrease.value(), 0.05);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
        assert_eq!(config.warm_up_text, "hello");
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let err = AppConfig::parse("neutral_decrease = -0.1").unwrap_err();
        assert!(matches!(err, CommentAiError::Configuration(_)));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        assert!(AppConfig::parse("concurrency = 0").is_err());
    }

    #[test]
    fn test_rejects_unknown_field() {
        assert!(AppConfig::parse("grouping_scheme = \"a\"").is_err());
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(AppConfig::parse("failure_policy = \"retry\"").is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = ConfigOverrides {
            grouping: Some("custom".to_string()),
            neutral_decrease: Some(0.2),
            concurrency: Some(1),
            isolate_failures: true,
            model_dir: Some(PathBuf::from("/tmp/model")),
        };
        let config = AppConfig::default().with_overrides(&overrides).unwrap();
        assert_eq!(config.grouping, "custom");
        assert_eq!(config.neutral_decrease.value(), 0.2);
        assert_eq!(config.batch_config().concurrency, 1);
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
        assert_eq!(
            config.oracle_config().model_dir,
            Some(PathBuf::from("/tmp/model"))
        );
    }

    #[test]
    fn test_overrides_validate() {
        let overrides = ConfigOverrides {
            neutral_decrease: Some(f64::NAN),
            ..Default::default()
        };
        assert!(AppConfig::default().with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_resolve_priority() {
        let explicit = PathBuf::from("/explicit.toml");
        let env = Some("/env.toml".to_string());

        assert_eq!(
            resolve_config_path(Some(&explicit), env.clone(), None),
            Some(explicit.clone())
        );
        assert_eq!(
            resolve_config_path(None, env, None),
            Some(PathBuf::from("/env.toml"))
        );
        assert_eq!(resolve_config_path(None, Some("  ".to_string()), None), None);
        assert_eq!(
            resolve_config_path(None, None, Some(PathBuf::from("/does/not/exist.toml"))),
            None
        );
    }
}
