//! Fitted TF-IDF vectorizer, read-only at serving time.
//!
//! The vocabulary and IDF weights are produced offline; this module only
//! applies them. Terms outside the vocabulary contribute nothing.

use crate::{Error, Result, SparseVector};
use ahash::AHashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default token pattern: runs of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Row normalization applied after weighting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

/// Serialized form of a fitted vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerData {
    /// term -> column index
    pub vocabulary: AHashMap<String, u32>,
    /// IDF weight per column
    pub idf: Vec<f32>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

impl VectorizerData {
    /// Vocabulary with the default flags (lowercase, raw tf, l2 norm)
    pub fn new(vocabulary: AHashMap<String, u32>, idf: Vec<f32>) -> Self {
        Self {
            vocabulary,
            idf,
            lowercase: true,
            sublinear_tf: false,
            norm: Norm::L2,
            token_pattern: default_token_pattern(),
        }
    }
}

pub struct TfIdfVectorizer {
    vocabulary: AHashMap<String, u32>,
    idf: Vec<f32>,
    lowercase: bool,
    sublinear_tf: bool,
    norm: Norm,
    token_pattern: Regex,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("sublinear_tf", &self.sublinear_tf)
            .field("norm", &self.norm)
            .field("token_pattern", &self.token_pattern.as_str())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Validate a fitted vocabulary and compile its token pattern
    pub fn from_data(data: VectorizerData) -> Result<Self> {
        let width = data.idf.len();
        if data.vocabulary.len() != width {
            return Err(Error::InvalidDimension {
                expected: width,
                actual: data.vocabulary.len(),
            });
        }

        let mut seen = vec![false; width];
        for (term, &column) in &data.vocabulary {
            let slot = seen.get_mut(column as usize).ok_or_else(|| {
                Error::InvalidArtifact(format!(
                    "term '{}' maps to column {} outside vocabulary of {}",
                    term, column, width
                ))
            })?;
            if *slot {
                return Err(Error::InvalidArtifact(format!(
                    "column {} is assigned to more than one term",
                    column
                )));
            }
            *slot = true;
        }

        if let Some(bad) = data.idf.iter().position(|w| !w.is_finite()) {
            return Err(Error::InvalidArtifact(format!(
                "idf weight for column {} is not finite",
                bad
            )));
        }

        let token_pattern = Regex::new(&data.token_pattern)
            .map_err(|e| Error::InvalidPattern(format!("{}: {}", data.token_pattern, e)))?;

        Ok(Self {
            vocabulary: data.vocabulary,
            idf: data.idf,
            lowercase: data.lowercase,
            sublinear_tf: data.sublinear_tf,
            norm: data.norm,
            token_pattern,
        })
    }

    /// Export back into the serializable form
    pub fn to_data(&self) -> VectorizerData {
        VectorizerData {
            vocabulary: self.vocabulary.clone(),
            idf: self.idf.clone(),
            lowercase: self.lowercase,
            sublinear_tf: self.sublinear_tf,
            norm: self.norm,
            token_pattern: self.token_pattern.as_str().to_string(),
        }
    }

    #[inline]
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Column of a term, if it was seen during fitting
    #[inline]
    pub fn column(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        self.token_pattern
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Weight `text` against the fitted vocabulary
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for token in self.tokenize(text) {
            if let Some(column) = self.column(&token) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let pairs: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(column, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (column, tf * self.idf[column as usize])
            })
            .collect();

        let mut vector = SparseVector::from_sorted_pairs(pairs);
        if self.norm == Norm::L2 {
            vector.normalize();
        }
        vector
    }
}
