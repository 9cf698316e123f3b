//! Correction heuristics applied to the ranked categories.
//!
//! Rules run in a fixed order and each may fire at most once:
//!
//! 1. neutral emotion that barely leads is replaced by the runner-up
//! 2. neutral sentiment that barely leads is replaced by the runner-up
//! 3. otherwise, a sentiment with no clear winner among the top three
//!    becomes neutral
//! 4. a sentiment contradicting the (corrected) emotion becomes neutral
//!
//! Rules 1 to 3 need three ranked categories and are skipped otherwise.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::category::{EmotionCategory, SentimentCategory};
use crate::models::classification::{Correction, RankedCategoryList};
use crate::CommentAiError;

/// Default margin below which a lead counts as weak.
pub const DEFAULT_NEUTRAL_DECREASE: f64 = 0.1;

/// Validated correction threshold: finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct NeutralDecrease(f64);

impl NeutralDecrease {
    pub fn new(value: f64) -> Result<Self, CommentAiError> {
        if !value.is_finite() || value < 0.0 {
            return Err(CommentAiError::Configuration(format!(
                "neutral_decrease must be a finite non-negative number, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for NeutralDecrease {
    fn default() -> Self {
        Self(DEFAULT_NEUTRAL_DECREASE)
    }
}

impl TryFrom<f64> for NeutralDecrease {
    type Error = CommentAiError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NeutralDecrease> for f64 {
    fn from(value: NeutralDecrease) -> Self {
        value.0
    }
}

/// Final labels after all rules ran.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionOutcome {
    pub emotion: EmotionCategory,
    pub sentiment: SentimentCategory,
    /// Fired rules in firing order
    pub corrections: Vec<Correction>,
}

/// Run the correction rules over both rankings.
///
/// An empty ranking (impossible for a validated scheme) yields `neutral`.
pub fn apply_corrections(
    emotions: &RankedCategoryList<EmotionCategory>,
    sentiments: &RankedCategoryList<SentimentCategory>,
    neutral_decrease: NeutralDecrease,
) -> CorrectionOutcome {
    let t = neutral_decrease.value();
    let mut emotion = emotions.category(0).unwrap_or(EmotionCategory::Neutral);
    let mut sentiment = sentiments.category(0).unwrap_or(SentimentCategory::Neutral);
    let mut corrections = Vec::new();

    if emotion == EmotionCategory::Neutral {
        if let (Some([e0, e1, e2]), Some(runner_up)) = (emotions.top_three(), emotions.category(1))
        {
            if e0 - e1 <= t && e0 - e2 > 2.0 * t {
                debug!(from = %emotion, to = %runner_up, "neutral emotion lead too weak");
                emotion = runner_up;
                corrections.push(Correction::NeutralDecreaseEmotion { threshold: t });
            }
        }
    }

    if let (Some([s0, s1, s2]), Some(runner_up)) = (sentiments.top_three(), sentiments.category(1))
    {
        if sentiment == SentimentCategory::Neutral && s0 - s1 <= t && s0 - s2 > 2.0 * t {
            debug!(from = %sentiment, to = %runner_up, "neutral sentiment lead too weak");
            sentiment = runner_up;
            corrections.push(Correction::NeutralDecreaseSentiment { threshold: t });
        } else if sentiment != SentimentCategory::Neutral && s0 - s1 <= t && s1 - s2 <= t {
            debug!(from = %sentiment, "no clear sentiment winner");
            sentiment = SentimentCategory::Neutral;
            corrections.push(Correction::SentimentControversial { threshold: t });
        }
    }

    let contradicts = (sentiment == SentimentCategory::Positive && emotion.is_negative())
        || (sentiment == SentimentCategory::Negative && emotion == EmotionCategory::Joy);
    if contradicts {
        debug!(sentiment = %sentiment, emotion = %emotion, "sentiment contradicts emotion");
        sentiment = SentimentCategory::Neutral;
        // tag composed after the override
        corrections.push(Correction::Contradiction { sentiment, emotion });
    }

    CorrectionOutcome {
        emotion,
        sentiment,
        corrections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::Category;
    use crate::models::classification::CategoryScore;

    fn ranked<C: Category>(scores: &[(C, f64)]) -> RankedCategoryList<C> {
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

    fn emotions(scores: &[(EmotionCategory, f64)]) -> RankedCategoryList<EmotionCategory> {
        ranked(scores)
    }

    fn sentiments(scores: &[(SentimentCategory, f64)]) -> RankedCategoryList<SentimentCategory> {
        ranked(scores)
    }

    fn clear_neutral_sentiment() -> RankedCategoryList<SentimentCategory> {
        sentiments(&[
            (SentimentCategory::Positive, 0.1),
            (SentimentCategory::Negative, 0.1),
            (SentimentCategory::Neutral, 0.9),
        ])
    }

    fn clear_neutral_emotion() -> RankedCategoryList<EmotionCategory> {
        emotions(&[
            (EmotionCategory::Joy, 0.05),
            (EmotionCategory::Anger, 0.05),
            (EmotionCategory::Sadness, 0.05),
            (EmotionCategory::Surprise, 0.05),
            (EmotionCategory::Fear, 0.05),
            (EmotionCategory::Neutral, 0.9),
        ])
    }

    #[test]
    fn test_no_rule_fires_on_clear_winners() {
        let outcome = apply_corrections(
            &clear_neutral_emotion(),
            &clear_neutral_sentiment(),
            NeutralDecrease::default(),
        );
        assert_eq!(outcome.emotion, EmotionCategory::Neutral);
        assert_eq!(outcome.sentiment, SentimentCategory::Neutral);
        assert!(outcome.corrections.is_empty());
    }

    #[test]
    fn test_neutral_decrease_emotion_fires_at_boundary() {
        let e = emotions(&[
            (EmotionCategory::Joy, 0.42),
            (EmotionCategory::Anger, 0.20),
            (EmotionCategory::Sadness, 0.0),
            (EmotionCategory::Surprise, 0.0),
            (EmotionCategory::Fear, 0.0),
            (EmotionCategory::Neutral, 0.50),
        ]);
        let outcome = apply_corrections(&e, &clear_neutral_sentiment(), NeutralDecrease::default());
        assert_eq!(outcome.emotion, EmotionCategory::Joy);
        assert_eq!(
            outcome.corrections,
            vec![Correction::NeutralDecreaseEmotion { threshold: 0.1 }]
        );
        assert_eq!(outcome.corrections[0].tag(), "neutral-decrease-emotion-0.100");
    }

    #[test]
    fn test_neutral_decrease_emotion_needs_clear_third() {
        // margin(0,2) = 0.15, not above 2 * 0.1
        let e = emotions(&[
            (EmotionCategory::Joy, 0.42),
            (EmotionCategory::Anger, 0.35),
            (EmotionCategory::Neutral, 0.50),
        ]);
        let outcome = apply_corrections(&e, &clear_neutral_sentiment(), NeutralDecrease::default());
        assert_eq!(outcome.emotion, EmotionCategory::Neutral);
        assert!(outcome.corrections.is_empty());
    }

    #[test]
    fn test_neutral_decrease_emotion_needs_close_second() {
        let e = emotions(&[
            (EmotionCategory::Joy, 0.30),
            (EmotionCategory::Anger, 0.10),
            (EmotionCategory::Neutral, 0.50),
        ]);
        let outcome = apply_corrections(&e, &clear_neutral_sentiment(), NeutralDecrease::default());
        assert_eq!(outcome.emotion, EmotionCategory::Neutral);
    }

    #[test]
    fn test_neutral_decrease_emotion_only_for_neutral_top() {
        let e = emotions(&[
            (EmotionCategory::Joy, 0.50),
            (EmotionCategory::Surprise, 0.42),
            (EmotionCategory::Neutral, 0.20),
        ]);
        let outcome = apply_corrections(&e, &clear_neutral_sentiment(), NeutralDecrease::default());
        assert_eq!(outcome.emotion, EmotionCategory::Joy);
        assert!(outcome.corrections.is_empty());
    }

    #[test]
    fn test_neutral_decrease_sentiment_fires() {
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.45),
            (SentimentCategory::Negative, 0.10),
            (SentimentCategory::Neutral, 0.50),
        ]);
        let e = emotions(&[
            (EmotionCategory::Joy, 0.9),
            (EmotionCategory::Anger, 0.1),
            (EmotionCategory::Neutral, 0.1),
        ]);
        let outcome = apply_corrections(&e, &s, NeutralDecrease::default());
        assert_eq!(outcome.sentiment, SentimentCategory::Positive);
        assert_eq!(
            outcome.corrections,
            vec![Correction::NeutralDecreaseSentiment { threshold: 0.1 }]
        );
    }

    #[test]
    fn test_sentiment_controversial_forces_neutral() {
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.33),
            (SentimentCategory::Negative, 0.40),
            (SentimentCategory::Neutral, 0.35),
        ]);
        let outcome = apply_corrections(&clear_neutral_emotion(), &s, NeutralDecrease::default());
        assert_eq!(outcome.sentiment, SentimentCategory::Neutral);
        assert_eq!(outcome.corrections.len(), 1);
        assert_eq!(outcome.corrections[0].tag(), "sentiment-controversial-0.100");
    }

    #[test]
    fn test_controversial_not_evaluated_after_neutral_decrease() {
        // neutral leads weakly over positive, negative far behind: rule 2 fires, rule 3 must not
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.45),
            (SentimentCategory::Negative, 0.05),
            (SentimentCategory::Neutral, 0.50),
        ]);
        let outcome = apply_corrections(&clear_neutral_emotion(), &s, NeutralDecrease::default());
        assert_eq!(outcome.sentiment, SentimentCategory::Positive);
        assert_eq!(
            outcome.corrections,
            vec![Correction::NeutralDecreaseSentiment { threshold: 0.1 }]
        );
    }

    #[test]
    fn test_controversial_needs_close_third() {
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.05),
            (SentimentCategory::Negative, 0.40),
            (SentimentCategory::Neutral, 0.35),
        ]);
        let outcome = apply_corrections(&clear_neutral_emotion(), &s, NeutralDecrease::default());
        assert_eq!(outcome.sentiment, SentimentCategory::Negative);
        assert!(outcome.corrections.is_empty());
    }

    #[test]
    fn test_contradiction_negative_joy() {
        let e = emotions(&[
            (EmotionCategory::Joy, 0.9),
            (EmotionCategory::Anger, 0.1),
            (EmotionCategory::Neutral, 0.0),
        ]);
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.1),
            (SentimentCategory::Negative, 0.9),
            (SentimentCategory::Neutral, 0.0),
        ]);
        let outcome = apply_corrections(&e, &s, NeutralDecrease::default());
        assert_eq!(outcome.emotion, EmotionCategory::Joy);
        assert_eq!(outcome.sentiment, SentimentCategory::Neutral);
        assert_eq!(outcome.corrections.len(), 1);
        assert_eq!(outcome.corrections[0].tag(), "neutral-joy");
    }

    #[test]
    fn test_contradiction_positive_with_negative_emotions() {
        for negative in [
            EmotionCategory::Anger,
            EmotionCategory::Sadness,
            EmotionCategory::Fear,
        ] {
            let e = emotions(&[
                (negative, 0.9),
                (EmotionCategory::Joy, 0.1),
                (EmotionCategory::Neutral, 0.0),
            ]);
            let s = sentiments(&[
                (SentimentCategory::Positive, 0.9),
                (SentimentCategory::Negative, 0.1),
                (SentimentCategory::Neutral, 0.0),
            ]);
            let outcome = apply_corrections(&e, &s, NeutralDecrease::default());
            assert_eq!(outcome.sentiment, SentimentCategory::Neutral);
            assert_eq!(outcome.corrections[0].tag(), format!("neutral-{}", negative));
        }
    }

    #[test]
    fn test_contradiction_uses_corrected_emotion() {
        // rule 1 turns neutral into joy, then negative sentiment contradicts it
        let e = emotions(&[
            (EmotionCategory::Joy, 0.42),
            (EmotionCategory::Anger, 0.20),
            (EmotionCategory::Neutral, 0.50),
        ]);
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.0),
            (SentimentCategory::Negative, 0.9),
            (SentimentCategory::Neutral, 0.1),
        ]);
        let outcome = apply_corrections(&e, &s, NeutralDecrease::default());
        assert_eq!(outcome.emotion, EmotionCategory::Joy);
        assert_eq!(outcome.sentiment, SentimentCategory::Neutral);
        let tags: Vec<_> = outcome.corrections.iter().map(|c| c.tag()).collect();
        assert_eq!(tags, vec!["neutral-decrease-emotion-0.100", "neutral-joy"]);
    }

    #[test]
    fn test_contradiction_after_neutral_decrease_sentiment() {
        let e = emotions(&[
            (EmotionCategory::Anger, 0.9),
            (EmotionCategory::Joy, 0.1),
            (EmotionCategory::Neutral, 0.0),
        ]);
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.45),
            (SentimentCategory::Negative, 0.05),
            (SentimentCategory::Neutral, 0.50),
        ]);
        let outcome = apply_corrections(&e, &s, NeutralDecrease::default());
        assert_eq!(outcome.sentiment, SentimentCategory::Neutral);
        let tags: Vec<_> = outcome.corrections.iter().map(|c| c.tag()).collect();
        assert_eq!(
            tags,
            vec!["neutral-decrease-sentiment-0.100", "neutral-anger"]
        );
    }

    #[test]
    fn test_degenerate_rankings_skip_margin_rules() {
        let e = emotions(&[
            (EmotionCategory::Neutral, 0.50),
            (EmotionCategory::Joy, 0.45),
        ]);
        let s = sentiments(&[
            (SentimentCategory::Negative, 0.40),
            (SentimentCategory::Positive, 0.39),
        ]);
        let outcome = apply_corrections(&e, &s, NeutralDecrease::default());
        assert_eq!(outcome.emotion, EmotionCategory::Neutral);
        assert_eq!(outcome.sentiment, SentimentCategory::Negative);
        assert!(outcome.corrections.is_empty());
    }

    #[test]
    fn test_empty_rankings_default_to_neutral() {
        let outcome = apply_corrections(
            &emotions(&[]),
            &sentiments(&[]),
            NeutralDecrease::default(),
        );
        assert_eq!(outcome.emotion, EmotionCategory::Neutral);
        assert_eq!(outcome.sentiment, SentimentCategory::Neutral);
        assert!(outcome.corrections.is_empty());
    }

    #[test]
    fn test_threshold_appears_in_tag() {
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.30),
            (SentimentCategory::Negative, 0.50),
            (SentimentCategory::Neutral, 0.10),
        ]);
        let outcome = apply_corrections(
            &clear_neutral_emotion(),
            &s,
            NeutralDecrease::new(0.25).unwrap(),
        );
        assert_eq!(outcome.corrections[0].tag(), "sentiment-controversial-0.250");
    }

    #[test]
    fn test_zero_threshold_only_fires_on_exact_ties() {
        let s = sentiments(&[
            (SentimentCategory::Positive, 0.40),
            (SentimentCategory::Negative, 0.40),
            (SentimentCategory::Neutral, 0.40),
        ]);
        let outcome = apply_corrections(
            &clear_neutral_emotion(),
            &s,
            NeutralDecrease::new(0.0).unwrap(),
        );
        assert_eq!(outcome.sentiment, SentimentCategory::Neutral);
        assert_eq!(outcome.corrections[0].tag(), "sentiment-controversial-0.000");
    }

    #[test]
    fn test_neutral_decrease_validation() {
        assert!(NeutralDecrease::new(-0.1).is_err());
        assert!(NeutralDecrease::new(f64::NAN).is_err());
        assert!(NeutralDecrease::new(f64::INFINITY).is_err());
        assert_eq!(NeutralDecrease::new(0.2).unwrap().value(), 0.2);
        let parsed: Result<NeutralDecrease, _> = serde_json::from_str("-1.0");
        assert!(parsed.is_err());
    }
}
