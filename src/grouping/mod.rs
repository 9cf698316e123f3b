//! Grouping schemes: how raw labels roll up into emotion and sentiment categories.
//!
//! A [`GroupingScheme`] is an explicit, validated configuration object. It is
//! built once at startup (from the built-in tables or a TOML file) and then
//! shared read-only. Validation is fail-fast: a table referencing an unknown
//! label or category never reaches classification.

mod builtin;
mod file;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::models::category::{Category, EmotionCategory, SentimentCategory};
use crate::models::label::RawLabel;
use crate::CommentAiError;

pub use builtin::{builtin_schemes, DEFAULT_GROUPING};
pub use file::{GroupSpec, SchemeFile, SchemeSpec};

/// One category and the raw labels summed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<C> {
    pub category: C,
    /// Member labels; a label listed twice is counted twice
    pub labels: Vec<RawLabel>,
}

/// Category → labels table in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingTable<C> {
    groups: Vec<CategoryGroup<C>>,
}

impl<C: Category> GroupingTable<C> {
    /// Validate and build a table from typed groups.
    pub fn new(scheme: &str, groups: Vec<CategoryGroup<C>>) -> Result<Self, CommentAiError> {
        if groups.is_empty() {
            return Err(CommentAiError::Configuration(format!(
                "Grouping '{}' has an empty {} table",
                scheme,
                C::KIND
            )));
        }

        let mut seen = BTreeSet::new();
        for group in &groups {
            if !seen.insert(group.category) {
                return Err(CommentAiError::Configuration(format!(
                    "Grouping '{}' declares {} category '{}' more than once",
                    scheme,
                    C::KIND,
                    group.category
                )));
            }
            if group.labels.is_empty() {
                return Err(CommentAiError::Configuration(format!(
                    "Grouping '{}' {} category '{}' has no labels",
                    scheme,
                    C::KIND,
                    group.category
                )));
            }
        }

        let table = Self { groups };
        let ungrouped: Vec<&str> = RawLabel::ALL
            .iter()
            .filter(|l| !table.contains_label(**l))
            .map(|l| l.as_str())
            .collect();
        if !ungrouped.is_empty() {
            tracing::debug!(
                "Grouping '{}' {} table leaves labels ungrouped: {}",
                scheme,
                C::KIND,
                ungrouped.join(", ")
            );
        }

        Ok(table)
    }

    /// Build a table from string names, as written in configuration.
    pub fn from_names<S: AsRef<str>>(
        scheme: &str,
        groups: &[(S, Vec<S>)],
    ) -> Result<Self, CommentAiError> {
        let typed = groups
            .iter()
            .map(|(category, labels)| {
                let category = C::parse(category.as_ref())?;
                let labels = labels
                    .iter()
                    .map(|l| {
                        l.as_ref().parse::<RawLabel>().map_err(|_| {
                            CommentAiError::Configuration(format!(
                                "Grouping '{}' {} category '{}' references unknown label '{}'",
                                scheme,
                                C::KIND,
                                category,
                                l.as_ref()
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CategoryGroup { category, labels })
            })
            .collect::<Result<Vec<_>, CommentAiError>>()?;
        Self::new(scheme, typed)
    }

    pub fn groups(&self) -> &[CategoryGroup<C>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains_label(&self, label: RawLabel) -> bool {
        self.groups.iter().any(|g| g.labels.contains(&label))
    }

    /// Labels listed more than once within a category, once per label.
    pub fn repeated_labels(&self) -> Vec<(C, RawLabel)> {
        let mut repeated = Vec::new();
        for group in &self.groups {
            let mut members = BTreeSet::new();
            let mut reported = BTreeSet::new();
            for label in &group.labels {
                if !members.insert(*label) && reported.insert(*label) {
                    repeated.push((group.category, *label));
                }
            }
        }
        repeated
    }
}

/// A named pair of emotion and sentiment tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingScheme {
    name: String,
    emotions: GroupingTable<EmotionCategory>,
    sentiments: GroupingTable<SentimentCategory>,
}

impl GroupingScheme {
    pub fn new(
        name: impl Into<String>,
        emotions: GroupingTable<EmotionCategory>,
        sentiments: GroupingTable<SentimentCategory>,
    ) -> Self {
        Self {
            name: name.into(),
            emotions,
            sentiments,
        }
    }

    /// Parse both tables from string names.
    pub fn from_names<S: AsRef<str>>(
        name: &str,
        emotions: &[(S, Vec<S>)],
        sentiments: &[(S, Vec<S>)],
    ) -> Result<Self, CommentAiError> {
        Ok(Self::new(
            name,
            GroupingTable::from_names(name, emotions)?,
            GroupingTable::from_names(name, sentiments)?,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn emotions(&self) -> &GroupingTable<EmotionCategory> {
        &self.emotions
    }

    pub fn sentiments(&self) -> &GroupingTable<SentimentCategory> {
        &self.sentiments
    }

    /// Human-readable notes for every label counted more than once.
    pub fn repeated_label_notes(&self) -> Vec<String> {
        fn notes<C: Category>(table: &GroupingTable<C>) -> impl Iterator<Item = String> + '_ {
            table.repeated_labels().into_iter().map(|(category, label)| {
                format!(
                    "label '{}' repeats in {} category '{}'",
                    label,
                    C::KIND,
                    category
                )
            })
        }
        notes(&self.emotions).chain(notes(&self.sentiments)).collect()
    }
}

/// All schemes available to the process, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct GroupingRegistry {
    schemes: Vec<Arc<GroupingScheme>>,
}

impl GroupingRegistry {
    /// Registry holding only the built-in schemes.
    pub fn builtin() -> Result<Self, CommentAiError> {
        let mut registry = Self::default();
        for scheme in builtin_schemes()? {
            registry.register(scheme)?;
        }
        Ok(registry)
    }

    /// Built-in schemes plus those defined in a TOML file.
    pub fn with_file(path: &Path) -> Result<Self, CommentAiError> {
        let mut registry = Self::builtin()?;
        let loaded = SchemeFile::load(path)?;
        let count = loaded.len();
        for scheme in loaded {
            registry.register(scheme)?;
        }
        info!(
            "Loaded {} grouping scheme(s) from {}",
            count,
            path.display()
        );
        Ok(registry)
    }

    /// Add a scheme. Names must be unique.
    pub fn register(&mut self, scheme: GroupingScheme) -> Result<(), CommentAiError> {
        if self.schemes.iter().any(|s| s.name() == scheme.name()) {
            return Err(CommentAiError::Configuration(format!(
                "Grouping '{}' is defined more than once",
                scheme.name()
            )));
        }
        self.schemes.push(Arc::new(scheme));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<GroupingScheme>, CommentAiError> {
        self.schemes
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| {
                CommentAiError::Configuration(format!(
                    "Unknown grouping '{}'. Available: {}",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemes.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<GroupingScheme>> {
        self.schemes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentiments() -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("positive", vec!["joy"]),
            ("negative", vec!["anger"]),
            ("neutral", vec!["neutral"]),
        ]
    }

    #[test]
    fn test_unknown_label_fails_at_load() {
        let err = GroupingScheme::from_names(
            "x",
            &[("joy", vec!["joy", "happiness"])],
            &sentiments(),
        )
        .unwrap_err();
        assert!(matches!(err, CommentAiError::Configuration(_)));
        assert!(err.to_string().contains("unknown label 'happiness'"));
    }

    #[test]
    fn test_unknown_category_fails_at_load() {
        let err =
            GroupingScheme::from_names("x", &[("bliss", vec!["joy"])], &sentiments()).unwrap_err();
        assert!(err.to_string().contains("emotion category 'bliss'"));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let err = GroupingScheme::from_names(
            "x",
            &[("joy", vec!["joy"]), ("joy", vec!["love"])],
            &sentiments(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_empty_table_and_empty_group_rejected() {
        let empty: Vec<(&str, Vec<&str>)> = vec![];
        assert!(GroupingScheme::from_names("x", &empty, &sentiments()).is_err());
        assert!(GroupingScheme::from_names("x", &[("joy", vec![])], &sentiments()).is_err());
    }

    #[test]
    fn test_repeated_label_is_kept() {
        let scheme = GroupingScheme::from_names(
            "x",
            &[("sadness", vec!["grief", "grief"])],
            &sentiments(),
        )
        .unwrap();
        assert_eq!(scheme.emotions().groups()[0].labels.len(), 2);
        assert_eq!(
            scheme.emotions().repeated_labels(),
            vec![(EmotionCategory::Sadness, RawLabel::Grief)]
        );
        assert_eq!(
            scheme.repeated_label_notes(),
            vec!["label 'grief' repeats in emotion category 'sadness'".to_string()]
        );
    }

    #[test]
    fn test_registry_lookup() {
        let registry = GroupingRegistry::builtin().unwrap();
        assert_eq!(registry.get("a").unwrap().name(), "a");
        let err = registry.get("zzz").unwrap_err();
        assert!(matches!(err, CommentAiError::Configuration(_)));
        assert!(err.to_string().contains("Available: a"));
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let mut registry = GroupingRegistry::builtin().unwrap();
        let again = GroupingScheme::from_names("a", &[("joy", vec!["joy"])], &sentiments())
            .unwrap();
        assert!(registry.register(again).is_err());
    }
}
