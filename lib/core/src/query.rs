//! Structured preference queries and their textual normal form.
//!
//! The normal form must line up with the text the catalog's vector rows
//! were built from, so the field order and cleaning here are fixed:
//! courses, facilities, fees, type, establishment, gender, state.

use crate::CollegeRecord;
use serde::{Deserialize, Serialize};

pub const FEE_OPTIONS: [&str; 3] = ["High Fees", "Medium Fees", "Low Fees"];
pub const COLLEGE_TYPE_OPTIONS: [&str; 2] = ["Private", "Public"];
pub const ESTABLISHMENT_OPTIONS: [&str; 2] = ["New College", "Old College"];
pub const GENDER_OPTIONS: [&str; 3] = ["Co-Ed", "Female", "Male"];

/// Preferences collected from the user. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceQuery {
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub fees: String,
    #[serde(default)]
    pub college_type: String,
    #[serde(default)]
    pub establishment: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub state: String,
}

/// Strip spaces inside each item, lowercase it and join with spaces.
/// Only `' '` is removed; other whitespace is left for the tokenizer.
/// `["Data Science", "AI Lab"]` becomes `"datascience ailab"`.
pub fn clean_and_join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| {
            item.as_ref()
                .chars()
                .filter(|c| *c != ' ')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl PreferenceQuery {
    /// Normal form fed to the vectorizer. Empty segments are skipped so the
    /// result never holds runs of spaces.
    pub fn normalized(&self) -> String {
        let segments = [
            clean_and_join(&self.courses),
            clean_and_join(&self.facilities),
            self.fees.to_lowercase(),
            self.college_type.to_lowercase(),
            self.establishment.to_lowercase(),
            self.gender.to_lowercase(),
            self.state.to_lowercase(),
        ];

        segments
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.normalized().is_empty()
    }
}

impl From<&CollegeRecord> for PreferenceQuery {
    fn from(record: &CollegeRecord) -> Self {
        Self {
            courses: record.courses.clone(),
            facilities: record.facilities.clone(),
            fees: record.fees.clone(),
            college_type: record.college_type.clone(),
            establishment: record.establishment.clone(),
            gender: record.gender.clone(),
            state: record.state.primary().unwrap_or_default().to_string(),
        }
    }
}
