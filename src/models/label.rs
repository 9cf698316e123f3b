//! The fixed GoEmotions label set and the per-text probability vector.
//!
//! The oracle emits one independent sigmoid probability per raw label, so a
//! [`RawProbabilityVector`] is not a distribution: values need not sum to 1.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CommentAiError;

/// Number of raw emotion classes produced by the oracle.
pub const RAW_LABEL_COUNT: usize = 28;

/// One of the 28 fine-grained GoEmotions classes.
///
/// Declaration order is the canonical label order and breaks ties when
/// picking the top raw label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawLabel {
    Admiration,
    Amusement,
    Anger,
    Annoyance,
    Approval,
    Caring,
    Confusion,
    Curiosity,
    Desire,
    Disappointment,
    Disapproval,
    Disgust,
    Embarrassment,
    Excitement,
    Fear,
    Gratitude,
    Grief,
    Joy,
    Love,
    Nervousness,
    Optimism,
    Pride,
    Realization,
    Relief,
    Remorse,
    Sadness,
    Surprise,
    Neutral,
}

impl RawLabel {
    /// All labels in canonical order.
    pub const ALL: [RawLabel; RAW_LABEL_COUNT] = [
        RawLabel::Admiration,
        RawLabel::Amusement,
        RawLabel::Anger,
        RawLabel::Annoyance,
        RawLabel::Approval,
        RawLabel::Caring,
        RawLabel::Confusion,
        RawLabel::Curiosity,
        RawLabel::Desire,
        RawLabel::Disappointment,
        RawLabel::Disapproval,
        RawLabel::Disgust,
        RawLabel::Embarrassment,
        RawLabel::Excitement,
        RawLabel::Fear,
        RawLabel::Gratitude,
        RawLabel::Grief,
        RawLabel::Joy,
        RawLabel::Love,
        RawLabel::Nervousness,
        RawLabel::Optimism,
        RawLabel::Pride,
        RawLabel::Realization,
        RawLabel::Relief,
        RawLabel::Remorse,
        RawLabel::Sadness,
        RawLabel::Surprise,
        RawLabel::Neutral,
    ];

    /// Position of this label in [`RawLabel::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RawLabel::Admiration => "admiration",
            RawLabel::Amusement => "amusement",
            RawLabel::Anger => "anger",
            RawLabel::Annoyance => "annoyance",
            RawLabel::Approval => "approval",
            RawLabel::Caring => "caring",
            RawLabel::Confusion => "confusion",
            RawLabel::Curiosity => "curiosity",
            RawLabel::Desire => "desire",
            RawLabel::Disappointment => "disappointment",
            RawLabel::Disapproval => "disapproval",
            RawLabel::Disgust => "disgust",
            RawLabel::Embarrassment => "embarrassment",
            RawLabel::Excitement => "excitement",
            RawLabel::Fear => "fear",
            RawLabel::Gratitude => "gratitude",
            RawLabel::Grief => "grief",
            RawLabel::Joy => "joy",
            RawLabel::Love => "love",
            RawLabel::Nervousness => "nervousness",
            RawLabel::Optimism => "optimism",
            RawLabel::Pride => "pride",
            RawLabel::Realization => "realization",
            RawLabel::Relief => "relief",
            RawLabel::Remorse => "remorse",
            RawLabel::Sadness => "sadness",
            RawLabel::Surprise => "surprise",
            RawLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for RawLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RawLabel {
    type Err = CommentAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RawLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| CommentAiError::Configuration(format!("Unknown raw label '{}'", s)))
    }
}

/// Independent per-label probabilities for one text.
///
/// Always holds exactly one finite value in `[0, 1]` per [`RawLabel`].
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProbabilityVector {
    values: [f64; RAW_LABEL_COUNT],
}

impl RawProbabilityVector {
    /// Build a vector from values in canonical label order.
    ///
    /// `-0.0` is stored as `0.0`.
    pub fn new(values: [f64; RAW_LABEL_COUNT]) -> Result<Self, CommentAiError> {
        for (label, value) in RawLabel::ALL.iter().zip(values.iter()) {
            if !value.is_finite() || !(0.0..=1.0).contains(value) {
                return Err(CommentAiError::Validation(format!(
                    "Probability for '{}' must be within [0, 1], got {}",
                    label, value
                )));
            }
        }
        Ok(Self {
            values: values.map(|v| v + 0.0),
        })
    }

    /// Build a vector from `(label, probability)` pairs.
    ///
    /// Every label must appear exactly once.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, CommentAiError>
    where
        I: IntoIterator<Item = (RawLabel, f64)>,
    {
        let mut values = [f64::NAN; RAW_LABEL_COUNT];
        let mut seen = [false; RAW_LABEL_COUNT];
        for (label, value) in pairs {
            if seen[label.index()] {
                return Err(CommentAiError::Validation(format!(
                    "Probability for '{}' given more than once",
                    label
                )));
            }
            seen[label.index()] = true;
            values[label.index()] = value;
        }
        if let Some(missing) = RawLabel::ALL.iter().find(|l| !seen[l.index()]) {
            return Err(CommentAiError::Validation(format!(
                "Probability vector is missing label '{}'",
                missing
            )));
        }
        Self::new(values)
    }

    /// A vector with every label at zero.
    pub fn zeros() -> Self {
        Self {
            values: [0.0; RAW_LABEL_COUNT],
        }
    }

    /// Copy of this vector with one label changed.
    pub fn with(&self, label: RawLabel, value: f64) -> Result<Self, CommentAiError> {
        let mut values = self.values;
        values[label.index()] = value;
        Self::new(values)
    }

    pub fn get(&self, label: RawLabel) -> f64 {
        self.values[label.index()]
    }

    /// Iterate `(label, probability)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (RawLabel, f64)> + '_ {
        RawLabel::ALL.iter().copied().zip(self.values.iter().copied())
    }

    /// Label with the highest probability; ties go to the earliest label.
    pub fn top_label(&self) -> RawLabel {
        let mut best = RawLabel::ALL[0];
        for (label, value) in self.iter().skip(1) {
            if value > self.get(best) {
                best = label;
            }
        }
        best
    }

    /// `(label, probability)` pairs sorted descending, ties in canonical order.
    pub fn sorted_desc(&self) -> Vec<(RawLabel, f64)> {
        let mut pairs: Vec<(RawLabel, f64)> = self.iter().collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        pairs
    }
}

impl Serialize for RawProbabilityVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(RAW_LABEL_COUNT))?;
        for (label, value) in self.iter() {
            map.serialize_entry(label.as_str(), &value)?;
        }
        map.end()
    }
}
