//! Category aggregation: sum raw label probabilities into ranked categories.

use std::collections::BTreeSet;

use crate::grouping::{GroupingScheme, GroupingTable};
use crate::models::category::{Category, EmotionCategory, SentimentCategory};
use crate::models::classification::{CategoryScore, LabelScore, RankedCategoryList, RawSummary};
use crate::models::label::RawProbabilityVector;

/// Default cut-off for [`summarize_raw`].
pub const RAW_SUMMARY_THRESHOLD: f64 = 0.03;

/// Score every category of `table` and rank them.
///
/// A category's score is the plain sum of its members' probabilities,
/// repeated members included. Ties rank in declaration order.
pub fn aggregate<C: Category>(
    vector: &RawProbabilityVector,
    table: &GroupingTable<C>,
) -> RankedCategoryList<C> {
    let scores = table
        .groups()
        .iter()
        .map(|group| CategoryScore {
            category: group.category,
            score: group.labels.iter().map(|l| vector.get(*l)).sum(),
        })
        .collect();
    RankedCategoryList::from_declared(scores)
}

/// Rank both tables of a scheme.
pub fn aggregate_scheme(
    vector: &RawProbabilityVector,
    scheme: &GroupingScheme,
) -> (
    RankedCategoryList<EmotionCategory>,
    RankedCategoryList<SentimentCategory>,
) {
    (
        aggregate(vector, scheme.emotions()),
        aggregate(vector, scheme.sentiments()),
    )
}

/// Thresholded listing of the raw vector plus distinct-member emotion sums.
pub fn summarize_raw(
    vector: &RawProbabilityVector,
    scheme: &GroupingScheme,
    threshold: f64,
) -> RawSummary {
    let filtered: Vec<LabelScore> = vector
        .sorted_desc()
        .into_iter()
        .filter(|(_, score)| *score > threshold)
        .map(|(label, score)| LabelScore { label, score })
        .collect();
    let top3 = filtered.iter().take(3).copied().collect();

    let categories = scheme
        .emotions()
        .groups()
        .iter()
        .map(|group| {
            let distinct: BTreeSet<_> = group.labels.iter().copied().collect();
            CategoryScore {
                category: group.category,
                score: distinct.into_iter().map(|l| vector.get(l)).sum(),
            }
        })
        .collect();

    RawSummary {
        threshold,
        filtered,
        top3,
        categories,
    }
}
