//! Classification output types: category rankings, correction records and
//! the per-comment result.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::models::category::{Category, EmotionCategory, SentimentCategory};
use crate::models::label::{RawLabel, RawProbabilityVector};

/// Aggregated score of one category. Not a probability; unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryScore<C> {
    pub category: C,
    pub score: f64,
}

/// Category scores sorted by descending score.
///
/// Ties keep the order the categories were declared in the grouping scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedCategoryList<C> {
    entries: Vec<CategoryScore<C>>,
}

impl<C: Category> RankedCategoryList<C> {
    /// Rank scores given in declaration order.
    pub fn from_declared(mut scores: Vec<CategoryScore<C>>) -> Self {
        // sort_by is stable, so equal scores (0.0 and -0.0 included) stay in
        // declaration order
        scores.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
        });
        Self { entries: scores }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn category(&self, rank: usize) -> Option<C> {
        self.entries.get(rank).map(|e| e.category)
    }

    pub fn score(&self, rank: usize) -> Option<f64> {
        self.entries.get(rank).map(|e| e.score)
    }

    /// Score of the category itself, wherever it ranks.
    pub fn score_of(&self, category: C) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.score)
    }

    /// Top three scores, or `None` for a degenerate ranking.
    pub fn top_three(&self) -> Option<[f64; 3]> {
        Some([self.score(0)?, self.score(1)?, self.score(2)?])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryScore<C>> {
        self.entries.iter()
    }
}

/// A correction heuristic that fired during classification.
///
/// Purely diagnostic; serialized as its tag string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Neutral emotion barely ahead of the runner-up, replaced by it.
    NeutralDecreaseEmotion { threshold: f64 },
    /// Neutral sentiment barely ahead of the runner-up, replaced by it.
    NeutralDecreaseSentiment { threshold: f64 },
    /// No clear sentiment winner among the top three, forced to neutral.
    SentimentControversial { threshold: f64 },
    /// Sentiment contradicted the emotion and was forced to neutral.
    ///
    /// Holds the pair as it stood when the tag was composed, i.e. after
    /// the override.
    Contradiction {
        sentiment: SentimentCategory,
        emotion: EmotionCategory,
    },
}

impl Correction {
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::NeutralDecreaseEmotion { threshold } => {
                write!(f, "neutral-decrease-emotion-{:.3}", threshold)
            }
            Correction::NeutralDecreaseSentiment { threshold } => {
                write!(f, "neutral-decrease-sentiment-{:.3}", threshold)
            }
            Correction::SentimentControversial { threshold } => {
                write!(f, "sentiment-controversial-{:.3}", threshold)
            }
            Correction::Contradiction { sentiment, emotion } => {
                write!(f, "{}-{}", sentiment, emotion)
            }
        }
    }
}

impl Serialize for Correction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Diagnostic detail kept alongside the final labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationDetail {
    /// Grouping scheme the scores were aggregated with
    pub grouping: String,
    pub emotions: RankedCategoryList<EmotionCategory>,
    pub sentiments: RankedCategoryList<SentimentCategory>,
    pub raw_emotions: RawProbabilityVector,
    /// Corrections in firing order
    pub correction: Vec<Correction>,
}

/// Final labels for one comment plus the trail that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub emotion: EmotionCategory,
    pub sentiment: SentimentCategory,
    /// Single most probable raw label, independent of any grouping
    pub raw_emotion: RawLabel,
    pub information: ClassificationDetail,
}

/// One raw label with its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: RawLabel,
    pub score: f64,
}

/// Thresholded view of a raw vector for quick inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSummary {
    pub threshold: f64,
    /// Labels strictly above the threshold, descending
    pub filtered: Vec<LabelScore>,
    /// First three entries of `filtered`
    pub top3: Vec<LabelScore>,
    /// Emotion category sums with each member label counted once
    pub categories: Vec<CategoryScore<EmotionCategory>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(scores: &[(SentimentCategory, f64)]) -> RankedCategoryList<SentimentCategory> {
        RankedCategoryList::from_declared(
            scores
                .iter()
                .map(|(category, score)| CategoryScore {
                    category: *category,
                    score: *score,
                })
                .collect(),
        )
    }

    #[test]
    fn test_ranking_sorts_descending() {
        let list = ranked(&[
            (SentimentCategory::Positive, 0.1),
            (SentimentCategory::Negative, 0.7),
            (SentimentCategory::Neutral, 0.4),
        ]);
        assert_eq!(list.category(0), Some(SentimentCategory::Negative));
        assert_eq!(list.category(1), Some(SentimentCategory::Neutral));
        assert_eq!(list.category(2), Some(SentimentCategory::Positive));
    }

    #[test]
    fn test_ranking_ties_keep_declaration_order() {
        let list = ranked(&[
            (SentimentCategory::Neutral, 0.5),
            (SentimentCategory::Positive, 0.5),
            (SentimentCategory::Negative, 0.5),
        ]);
        assert_eq!(list.category(0), Some(SentimentCategory::Neutral));
        assert_eq!(list.category(1), Some(SentimentCategory::Positive));
        assert_eq!(list.category(2), Some(SentimentCategory::Negative));
    }

    #[test]
    fn test_signed_zero_scores_tie() {
        let list = ranked(&[
            (SentimentCategory::Positive, -0.0),
            (SentimentCategory::Negative, 0.0),
            (SentimentCategory::Neutral, 0.0),
        ]);
        assert_eq!(list.category(0), Some(SentimentCategory::Positive));
        assert_eq!(list.category(1), Some(SentimentCategory::Negative));
        assert_eq!(list.category(2), Some(SentimentCategory::Neutral));
    }

    #[test]
    fn test_top_three_guards_missing_ranks() {
        let list = ranked(&[
            (SentimentCategory::Positive, 0.9),
            (SentimentCategory::Negative, 0.2),
        ]);
        assert_eq!(list.score(2), None);
        assert_eq!(list.top_three(), None);
        assert_eq!(list.score_of(SentimentCategory::Negative), Some(0.2));
        assert_eq!(list.score_of(SentimentCategory::Neutral), None);
    }

    #[test]
    fn test_correction_tags() {
        assert_eq!(
            Correction::NeutralDecreaseEmotion { threshold: 0.1 }.tag(),
            "neutral-decrease-emotion-0.100"
        );
        assert_eq!(
            Correction::NeutralDecreaseSentiment { threshold: 0.25 }.tag(),
            "neutral-decrease-sentiment-0.250"
        );
        assert_eq!(
            Correction::SentimentControversial { threshold: 0.1 }.tag(),
            "sentiment-controversial-0.100"
        );
        assert_eq!(
            Correction::Contradiction {
                sentiment: SentimentCategory::Neutral,
                emotion: EmotionCategory::Joy,
            }
            .tag(),
            "neutral-joy"
        );
    }

    #[test]
    fn test_correction_serializes_as_tag() {
        let json =
            serde_json::to_value(vec![Correction::SentimentControversial { threshold: 0.05 }])
                .unwrap();
        assert_eq!(json, serde_json::json!(["sentiment-controversial-0.050"]));
    }

    #[test]
    fn test_ranking_serializes_as_list() {
        let list = ranked(&[(SentimentCategory::Positive, 0.5)]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "category": "positive", "score": 0.5 }])
        );
    }
}
