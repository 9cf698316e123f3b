//! CLI interface for comment-ai.

pub mod handlers;
pub mod output;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AppConfig, ConfigOverrides};
use crate::init::{load_registry, AppContext};
use output::OutputMode;

/// comment-ai - Emotion and sentiment classification for user comments
#[derive(Parser)]
#[command(name = "comment-ai", version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: $COMMENT_AI_CONFIG or {config_dir}/comment-ai/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Local model directory (config.json, tokenizer.json, model.safetensors)
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a single comment
    Classify {
        /// Comment text
        text: String,
        /// Grouping scheme to aggregate with
        #[arg(long)]
        grouping: Option<String>,
        /// Margin under which a leading category counts as weak
        #[arg(long)]
        neutral_decrease: Option<f64>,
        /// Also show raw labels above the summary threshold
        #[arg(long)]
        full: bool,
    },

    /// Classify a batch request ({"comments": [{"id": .., "text": ..}]})
    Analyze {
        /// Request file (.json, .yaml or .yml); reads JSON from stdin if omitted
        #[arg(long, short)]
        file: Option<PathBuf>,
        /// Grouping scheme to aggregate with
        #[arg(long)]
        grouping: Option<String>,
        /// Margin under which a leading category counts as weak
        #[arg(long)]
        neutral_decrease: Option<f64>,
        /// Max predictions in flight (1 = sequential)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Report failed comments under "errors" instead of failing the batch
        #[arg(long)]
        isolate_failures: bool,
        /// Show the emotion/sentiment distribution
        #[arg(long)]
        stats: bool,
    },

    /// List grouping schemes, or show one scheme's tables
    Groupings {
        /// Scheme name
        name: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// Command-line values that override the config file.
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            model_dir: self.model_dir.clone(),
            ..Default::default()
        };
        match &self.command {
            Commands::Classify {
                grouping,
                neutral_decrease,
                ..
            } => {
                overrides.grouping = grouping.clone();
                overrides.neutral_decrease = *neutral_decrease;
            }
            Commands::Analyze {
                grouping,
                neutral_decrease,
                concurrency,
                isolate_failures,
                ..
            } => {
                overrides.grouping = grouping.clone();
                overrides.neutral_decrease = *neutral_decrease;
                overrides.concurrency = *concurrency;
                overrides.isolate_failures = *isolate_failures;
            }
            Commands::Groupings { .. } | Commands::Completions { .. } => {}
        }
        overrides
    }

    /// Resolve the config file and apply command-line overrides.
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        let config = AppConfig::load(self.config.as_deref())?;
        Ok(config.with_overrides(&self.overrides())?)
    }
}

/// Run the parsed command.
///
/// Only `classify` and `analyze` load the model.
pub async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let mode = OutputMode::from_json_flag(cli.json);

    match &cli.command {
        Commands::Classify { text, full, .. } => {
            let ctx = AppContext::new(cli.load_config()?).await?;
            handlers::classify::handle_classify(&ctx, text, *full, mode).await?
        }

        Commands::Analyze { file, stats, .. } => {
            let ctx = AppContext::new(cli.load_config()?).await?;
            handlers::analyze::handle_analyze(&ctx, file.as_deref(), *stats, mode).await?
        }

        Commands::Groupings { name } => {
            let config = cli.load_config()?;
            let registry = load_registry(&config)?;
            handlers::groupings::handle_groupings(&registry, &config.grouping, name.as_deref(), mode)?
        }

        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "comment-ai",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
