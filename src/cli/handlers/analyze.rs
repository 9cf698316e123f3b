use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use indicatif::ProgressBar;

use crate::cli::output::{
    create_spinner, output_json, print_header, print_kv, print_table, truncate, OutputMode,
};
use crate::init::AppContext;
use crate::models::batch::{BatchRequest, BatchResponse, BatchStats};
use crate::services::progress::ProgressReporter;

/// Spinner-backed progress for batch runs.
struct SpinnerReporter {
    spinner: ProgressBar,
}

#[async_trait]
impl ProgressReporter for SpinnerReporter {
    async fn report(&self, _current: f64, _total: f64, message: Option<String>) {
        if let Some(message) = message {
            self.spinner.set_message(message);
        }
    }
}

/// Parse a batch request; YAML when the path ends in `.yaml`/`.yml`, JSON otherwise.
pub fn parse_request(content: &str, path: Option<&Path>) -> anyhow::Result<BatchRequest> {
    let is_yaml = path
        .and_then(|p| p.extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        serde_yaml_ng::from_str(content).map_err(|e| anyhow::anyhow!("Invalid YAML: {}", e))
    } else {
        serde_json::from_str(content).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))
    }
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file '{}': {}", path.display(), e)),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            Ok(content)
        }
    }
}

pub async fn handle_analyze(
    ctx: &AppContext,
    file: Option<&Path>,
    stats: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let content = read_input(file)?;
    let request = parse_request(&content, file)?;

    let spinner = create_spinner(&format!("Classifying {} comments", request.comments.len()));
    let reporter = Arc::new(SpinnerReporter {
        spinner: spinner.clone(),
    });
    let outcome = ctx
        .orchestrator
        .analyze_with_progress(request, reporter)
        .await;
    spinner.finish_and_clear();
    let response = outcome?;

    let batch_stats = stats.then(|| BatchStats::from_response(&response));

    match mode {
        OutputMode::Json => match &batch_stats {
            Some(batch_stats) => output_json(&serde_json::json!({
                "response": response,
                "stats": batch_stats,
            })),
            None => output_json(&response),
        },
        OutputMode::Human => {
            print_response(&response);
            if let Some(batch_stats) = &batch_stats {
                print_stats(batch_stats);
            }
        }
    }

    Ok(())
}

fn print_response(response: &BatchResponse) {
    print_header("Comments");
    print_table(
        &["ID", "Emotion", "Sentiment", "Text"],
        response
            .comments
            .iter()
            .map(|(id, verdict)| {
                vec![
                    id.clone(),
                    verdict.emotion.to_string(),
                    verdict.sentiment.to_string(),
                    truncate(&verdict.text, 60),
                ]
            })
            .collect(),
    );

    if !response.errors.is_empty() {
        print_header(&"Failed".red().bold().to_string());
        print_table(
            &["ID", "Error"],
            response
                .errors
                .iter()
                .map(|(id, error)| vec![id.clone(), error.clone()])
                .collect(),
        );
    }

    println!();
    print_kv("amount", &response.amount.to_string());
    print_kv("elapsed", &format!("{} ms", response.elapsed_ms));
}

fn print_stats(stats: &BatchStats) {
    print_header("Distribution");
    print_kv("analyzed", &format!("{}/{}", stats.analyzed, stats.amount));
    print_kv("average length", &format!("{} chars", stats.average_length));

    let mut rows: Vec<Vec<String>> = stats
        .emotions
        .iter()
        .map(|(category, count)| {
            vec![
                "emotion".to_string(),
                category.to_string(),
                count.to_string(),
            ]
        })
        .collect();
    rows.extend(stats.sentiments.iter().map(|(category, count)| {
        vec![
            "sentiment".to_string(),
            category.to_string(),
            count.to_string(),
        ]
    }));
    print_table(&["Kind", "Category", "Count"], rows);
}
