//! Coarse categories the raw labels are grouped into.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CommentAiError;

/// A coarse category kind (emotion or sentiment) with a fixed vocabulary.
pub trait Category:
    Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Serialize + Send + Sync + 'static
{
    /// Every category of this kind.
    const ALL: &'static [Self];

    /// Human name of the grouping kind, used in error messages.
    const KIND: &'static str;

    fn as_str(self) -> &'static str;

    /// Parse a category name, failing with a configuration error.
    fn parse(name: &str) -> Result<Self, CommentAiError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| {
                CommentAiError::Configuration(format!("Unknown {} category '{}'", Self::KIND, name))
            })
    }
}

/// Emotion category exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionCategory {
    Joy,
    Anger,
    Sadness,
    Surprise,
    Fear,
    Neutral,
}

impl EmotionCategory {
    /// Negative emotions that contradict a positive sentiment.
    pub fn is_negative(self) -> bool {
        matches!(
            self,
            EmotionCategory::Anger | EmotionCategory::Sadness | EmotionCategory::Fear
        )
    }
}

impl Category for EmotionCategory {
    const ALL: &'static [Self] = &[
        EmotionCategory::Joy,
        EmotionCategory::Anger,
        EmotionCategory::Sadness,
        EmotionCategory::Surprise,
        EmotionCategory::Fear,
        EmotionCategory::Neutral,
    ];
    const KIND: &'static str = "emotion";

    fn as_str(self) -> &'static str {
        match self {
            EmotionCategory::Joy => "joy",
            EmotionCategory::Anger => "anger",
            EmotionCategory::Sadness => "sadness",
            EmotionCategory::Surprise => "surprise",
            EmotionCategory::Fear => "fear",
            EmotionCategory::Neutral => "neutral",
        }
    }
}

/// Sentiment polarity exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl Category for SentimentCategory {
    const ALL: &'static [Self] = &[
        SentimentCategory::Positive,
        SentimentCategory::Negative,
        SentimentCategory::Neutral,
    ];
    const KIND: &'static str = "sentiment";

    fn as_str(self) -> &'static str {
        match self {
            SentimentCategory::Positive => "positive",
            SentimentCategory::Negative => "negative",
            SentimentCategory::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionCategory {
    type Err = CommentAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as Category>::parse(s)
    }
}

impl FromStr for SentimentCategory {
    type Err = CommentAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as Category>::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_categories() {
        assert_eq!("fear".parse::<EmotionCategory>().unwrap(), EmotionCategory::Fear);
        assert_eq!(
            "negative".parse::<SentimentCategory>().unwrap(),
            SentimentCategory::Negative
        );
    }

    #[test]
    fn test_parse_unknown_category_names_kind() {
        let err = "mixed".parse::<SentimentCategory>().unwrap_err();
        assert!(err.to_string().contains("sentiment category 'mixed'"));
    }

    #[test]
    fn test_negative_emotions() {
        let negative: Vec<_> = EmotionCategory::ALL
            .iter()
            .filter(|c| c.is_negative())
            .collect();
        assert_eq!(
            negative,
            vec![
                &EmotionCategory::Anger,
                &EmotionCategory::Sadness,
                &EmotionCategory::Fear
            ]
        );
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_value(EmotionCategory::Surprise).unwrap(),
            "surprise"
        );
        let s: SentimentCategory = serde_json::from_str("\"positive\"").unwrap();
        assert_eq!(s, SentimentCategory::Positive);
    }
}
