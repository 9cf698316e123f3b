//! comment-ai - Emotion and sentiment classification for user comments
//!
//! Usage:
//!   comment-ai classify "text"            Classify one comment
//!   comment-ai analyze --file batch.json  Classify a batch request
//!   comment-ai groupings [NAME]           Show grouping schemes
//!   comment-ai --help                     Show all commands

use anyhow::Result;
use clap::Parser;

use comment_ai::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("comment_ai=info".parse()?),
        )
        .init();

    comment_ai::cli::execute(&cli).await
}
