use colored::Colorize;

use crate::cli::output::{
    format_score, output_json, print_header, print_hint, print_kv, print_table, OutputMode,
};
use crate::init::AppContext;
use crate::models::classification::{ClassificationResult, RawSummary};
use crate::services::aggregator::RAW_SUMMARY_THRESHOLD;

pub async fn handle_classify(
    ctx: &AppContext,
    text: &str,
    full: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let result = ctx.classifier.classify(text).await?;
    let summary = full.then(|| {
        ctx.classifier
            .summarize(&result.information.raw_emotions, RAW_SUMMARY_THRESHOLD)
    });

    match mode {
        OutputMode::Json => match &summary {
            Some(summary) => output_json(&serde_json::json!({
                "result": result,
                "summary": summary,
            })),
            None => output_json(&result),
        },
        OutputMode::Human => {
            print_result(&result);
            if let Some(summary) = &summary {
                print_summary(summary);
            }
        }
    }

    Ok(())
}

fn print_result(result: &ClassificationResult) {
    print_header("Classification");
    print_kv("emotion", &result.emotion.to_string().bold().to_string());
    print_kv("sentiment", &result.sentiment.to_string().bold().to_string());
    print_kv("raw emotion", result.raw_emotion.as_str());
    print_kv("grouping", &result.information.grouping);

    let corrections: Vec<String> = result
        .information
        .correction
        .iter()
        .map(|c| c.tag())
        .collect();
    if corrections.is_empty() {
        print_kv("corrections", "none");
    } else {
        print_kv("corrections", &corrections.join(", "));
    }

    print_header("Emotions");
    print_table(
        &["Category", "Score"],
        result
            .information
            .emotions
            .iter()
            .map(|s| vec![s.category.to_string(), format_score(s.score)])
            .collect(),
    );

    print_header("Sentiments");
    print_table(
        &["Category", "Score"],
        result
            .information
            .sentiments
            .iter()
            .map(|s| vec![s.category.to_string(), format_score(s.score)])
            .collect(),
    );
}

fn print_summary(summary: &RawSummary) {
    print_header(&format!("Raw labels above {}", summary.threshold));
    print_table(
        &["Label", "Probability"],
        summary
            .filtered
            .iter()
            .map(|s| vec![s.label.to_string(), format_score(s.score)])
            .collect(),
    );

    let top3: Vec<&str> = summary.top3.iter().map(|s| s.label.as_str()).collect();
    print_hint(&format!("Top 3: {}", top3.join(", ")));

    print_header("Emotion sums (each label counted once)");
    print_table(
        &["Category", "Score"],
        summary
            .categories
            .iter()
            .map(|s| vec![s.category.to_string(), format_score(s.score)])
            .collect(),
    );
}
