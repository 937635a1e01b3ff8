use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A sparse vector of term weights.
///
/// Indices are strictly increasing; the two arrays always have equal length.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawSparseVector")]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct RawSparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl TryFrom<RawSparseVector> for SparseVector {
    type Error = Error;

    fn try_from(raw: RawSparseVector) -> Result<Self> {
        SparseVector::new(raw.indices, raw.values)
    }
}

impl SparseVector {
    /// Build from parallel arrays, sorting by index and rejecting duplicates.
    pub fn new(indices: Vec<u32>, values: Vec<f32>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(Error::InvalidDimension {
                expected: indices.len(),
                actual: values.len(),
            });
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidArtifact(
                "sparse vector has non-finite weights".to_string(),
            ));
        }

        let mut pairs: Vec<(u32, f32)> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|(i, _)| *i);
        if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(Error::InvalidArtifact(
                "sparse vector has duplicate indices".to_string(),
            ));
        }

        Ok(Self::from_sorted_pairs(pairs))
    }

    /// Pairs must already be sorted by index without duplicates.
    pub(crate) fn from_sorted_pairs(pairs: Vec<(u32, f32)>) -> Self {
        let (indices, values) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Largest stored index, if any
    #[inline]
    pub fn max_index(&self) -> Option<u32> {
        self.indices.last().copied()
    }

    /// Dot product by merging the two index lists
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;

        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Cosine similarity; zero when either side has no weight
    #[inline]
    pub fn cosine_similarity(&self, other: &SparseVector) -> f32 {
        let norm_a = self.norm();
        let norm_b = other.norm();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        self.dot(other) / (norm_a * norm_b)
    }

    /// Scale to unit length. Zero vectors are left untouched.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f32::EPSILON {
            let inv_norm = 1.0 / norm;
            for x in &mut self.values {
                *x *= inv_norm;
            }
        }
    }
}
