//! Batch request/response envelope for classifying many comments at once.
//!
//! Shapes follow the JSON contract:
//! `{ comments: [{ id?, text }] }` in, and
//! `{ elapsed_ms, amount, comments: { id: { text, sentiment, emotion } } }` out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::category::{Category, EmotionCategory, SentimentCategory};
use crate::models::classification::ClassificationResult;
use crate::CommentAiError;

/// A batch of comments to classify.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub comments: Vec<BatchComment>,
}

/// One comment in a batch request.
///
/// `text` is optional at the parsing layer so that a missing field is
/// reported as a validation error naming the item, not a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchComment {
    /// Integer ids from numeric primary keys are kept as their decimal string
    #[serde(
        default,
        deserialize_with = "id_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Accept an id written as a string or an integer.
fn id_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct IdVisitor;
    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a string or integer id")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: serde::Deserializer<'de>>(
            self,
            deserializer: D2,
        ) -> Result<Self::Value, D2::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_owned()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
    }

    deserializer.deserialize_option(IdVisitor)
}

impl BatchComment {
    /// Comment with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: Some(text.into()),
        }
    }

    /// Comment with a caller-supplied id.
    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: Some(text.into()),
        }
    }
}

impl BatchRequest {
    pub fn new(comments: Vec<BatchComment>) -> Self {
        Self { comments }
    }

    /// Check every item carries text. One bad item fails the whole batch.
    pub fn validate(&self) -> Result<(), CommentAiError> {
        for (position, comment) in self.comments.iter().enumerate() {
            if comment.text.is_none() {
                let which = match &comment.id {
                    Some(id) => format!("comment '{}'", id),
                    None => format!("comment #{}", position),
                };
                return Err(CommentAiError::Validation(format!(
                    "{} is missing required field 'text'",
                    which
                )));
            }
        }
        Ok(())
    }
}

/// Projection of a [`ClassificationResult`] exposed in batch responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentVerdict {
    pub text: String,
    pub sentiment: SentimentCategory,
    pub emotion: EmotionCategory,
}

impl CommentVerdict {
    pub fn from_result(text: String, result: &ClassificationResult) -> Self {
        Self {
            text,
            sentiment: result.sentiment,
            emotion: result.emotion,
        }
    }
}

/// Classified batch with timing metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Wall-clock duration of the whole batch, rounded to 3 decimals
    pub elapsed_ms: f64,
    /// Number of input items, including any that failed
    pub amount: usize,
    /// Verdicts keyed by comment id; duplicate ids keep the last item
    pub comments: BTreeMap<String, CommentVerdict>,
    /// Per-item failures when failures are isolated instead of aborting
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

/// Label distribution over a classified batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStats {
    pub amount: usize,
    pub analyzed: usize,
    /// Mean comment length in characters, rounded to 3 decimals
    pub average_length: f64,
    pub emotions: BTreeMap<EmotionCategory, usize>,
    pub sentiments: BTreeMap<SentimentCategory, usize>,
}

impl BatchStats {
    pub fn from_response(response: &BatchResponse) -> Self {
        let mut emotions: BTreeMap<EmotionCategory, usize> =
            EmotionCategory::ALL.iter().map(|c| (*c, 0)).collect();
        let mut sentiments: BTreeMap<SentimentCategory, usize> =
            SentimentCategory::ALL.iter().map(|c| (*c, 0)).collect();
        let mut total_chars = 0usize;

        for verdict in response.comments.values() {
            *emotions.entry(verdict.emotion).or_default() += 1;
            *sentiments.entry(verdict.sentiment).or_default() += 1;
            total_chars += verdict.text.chars().count();
        }

        let analyzed = response.comments.len();
        let average_length = if analyzed == 0 {
            0.0
        } else {
            round3(total_chars as f64 / analyzed as f64)
        };

        Self {
            amount: response.amount,
            analyzed,
            average_length,
            emotions,
            sentiments,
        }
    }
}

/// Round to 3 decimal digits.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
