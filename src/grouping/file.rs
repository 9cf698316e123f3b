//! TOML definitions for additional grouping schemes.
//!
//! ```toml
//! [[scheme]]
//! name = "b"
//!
//! [[scheme.emotions]]
//! category = "joy"
//! labels = ["joy", "love"]
//!
//! [[scheme.sentiments]]
//! category = "positive"
//! labels = ["joy", "love"]
//! ```
//!
//! Categories are declared in file order, which is the ranking tie-break.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::GroupingScheme;
use crate::CommentAiError;

/// Top-level layout of a grouping file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemeFile {
    #[serde(default)]
    pub scheme: Vec<SchemeSpec>,
}

/// One scheme as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeSpec {
    pub name: String,
    #[serde(default)]
    pub emotions: Vec<GroupSpec>,
    #[serde(default)]
    pub sentiments: Vec<GroupSpec>,
}

/// One category row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpec {
    pub category: String,
    pub labels: Vec<String>,
}

impl SchemeSpec {
    pub fn into_scheme(self) -> Result<GroupingScheme, CommentAiError> {
        let emotions: Vec<(String, Vec<String>)> = self
            .emotions
            .into_iter()
            .map(|g| (g.category, g.labels))
            .collect();
        let sentiments: Vec<(String, Vec<String>)> = self
            .sentiments
            .into_iter()
            .map(|g| (g.category, g.labels))
            .collect();
        let scheme = GroupingScheme::from_names(&self.name, &emotions, &sentiments)?;
        for note in scheme.repeated_label_notes() {
            warn!(
                "Grouping '{}': {} and will be counted more than once",
                scheme.name(),
                note
            );
        }
        Ok(scheme)
    }
}

impl SchemeFile {
    pub fn parse(contents: &str) -> Result<Vec<GroupingScheme>, CommentAiError> {
        let file: SchemeFile = toml::from_str(contents)?;
        file.scheme
            .into_iter()
            .map(SchemeSpec::into_scheme)
            .collect()
    }

    pub fn load(path: &Path) -> Result<Vec<GroupingScheme>, CommentAiError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CommentAiError::Configuration(format!(
                "Failed to read grouping file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&contents)
    }
}
