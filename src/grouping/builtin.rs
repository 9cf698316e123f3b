//! Built-in grouping tables.

use tracing::debug;

use super::GroupingScheme;
use crate::CommentAiError;

/// Scheme used when none is requested.
pub const DEFAULT_GROUPING: &str = "a";

/// Scheme `a`, the reference grouping.
///
/// `sadness` lists its five members twice, so they weigh double, and
/// `embarrassment` also feeds `fear`. Both are kept as authored: changing
/// them changes classification outputs.
fn scheme_a() -> Result<GroupingScheme, CommentAiError> {
    GroupingScheme::from_names(
        "a",
        &[
            (
                "joy",
                vec![
                    "admiration",
                    "amusement",
                    "excitement",
                    "gratitude",
                    "joy",
                    "love",
                    "optimism",
                    "pride",
                    "approval",
                ],
            ),
            ("anger", vec!["anger", "annoyance", "disapproval", "disgust"]),
            (
                "sadness",
                vec![
                    "disappointment",
                    "grief",
                    "remorse",
                    "sadness",
                    "embarrassment",
                    "disappointment",
                    "grief",
                    "remorse",
                    "sadness",
                    "embarrassment",
                ],
            ),
            (
                "surprise",
                vec!["confusion", "curiosity", "realization", "relief", "surprise"],
            ),
            ("fear", vec!["embarrassment", "fear", "nervousness"]),
            ("neutral", vec!["neutral"]),
        ],
        &[
            (
                "positive",
                vec![
                    "approval",
                    "admiration",
                    "amusement",
                    "excitement",
                    "joy",
                    "love",
                    "optimism",
                ],
            ),
            (
                "negative",
                vec![
                    "disapproval",
                    "anger",
                    "annoyance",
                    "disappointment",
                    "disgust",
                    "fear",
                    "grief",
                    "nervousness",
                    "sadness",
                ],
            ),
            (
                "neutral",
                vec![
                    "caring",
                    "confusion",
                    "curiosity",
                    "desire",
                    "gratitude",
                    "pride",
                    "realization",
                    "relief",
                    "remorse",
                    "surprise",
                    "neutral",
                ],
            ),
        ],
    )
}

/// Every built-in scheme, in registration order.
pub fn builtin_schemes() -> Result<Vec<GroupingScheme>, CommentAiError> {
    let schemes = vec![scheme_a()?];
    for scheme in &schemes {
        for note in scheme.repeated_label_notes() {
            debug!("Grouping '{}': {}", scheme.name(), note);
        }
    }
    Ok(schemes)
}
