//! Precomputed matrices consumed at serving time.
//!
//! [`VectorMatrix`] holds one TF-IDF row per catalog record and is scored
//! against query vectors. [`SimilarityMatrix`] is the dense pairwise table
//! behind the college-to-college mode.

use crate::{Error, Result, SparseVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest accepted difference between `m[i][j]` and `m[j][i]`
pub const SYMMETRY_TOLERANCE: f32 = 1e-4;

/// Sparse TF-IDF rows aligned by index with a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawVectorMatrix")]
pub struct VectorMatrix {
    n_features: usize,
    rows: Vec<SparseVector>,
}

#[derive(Deserialize)]
struct RawVectorMatrix {
    n_features: usize,
    rows: Vec<SparseVector>,
}

impl TryFrom<RawVectorMatrix> for VectorMatrix {
    type Error = Error;

    fn try_from(raw: RawVectorMatrix) -> Result<Self> {
        VectorMatrix::new(raw.n_features, raw.rows)
    }
}

impl VectorMatrix {
    pub fn new(n_features: usize, rows: Vec<SparseVector>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if let Some(max) = row.max_index() {
                if max as usize >= n_features {
                    return Err(Error::InvalidArtifact(format!(
                        "vector row {} references column {} but matrix has {} features",
                        i, max, n_features
                    )));
                }
            }
        }
        Ok(Self { n_features, rows })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }

    /// Cosine similarity of `query` against every row, in row order
    pub fn cosine_scores(&self, query: &SparseVector) -> Vec<f32> {
        self.rows
            .par_iter()
            .map(|row| row.cosine_similarity(query))
            .collect()
    }
}

/// Dense square similarity table, row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSimilarityMatrix", into = "RawSimilarityMatrix")]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct RawSimilarityMatrix {
    rows: Vec<Vec<f32>>,
}

impl TryFrom<RawSimilarityMatrix> for SimilarityMatrix {
    type Error = Error;

    fn try_from(raw: RawSimilarityMatrix) -> Result<Self> {
        SimilarityMatrix::from_rows(raw.rows)
    }
}

impl From<SimilarityMatrix> for RawSimilarityMatrix {
    fn from(matrix: SimilarityMatrix) -> Self {
        let rows = if matrix.size == 0 {
            Vec::new()
        } else {
            matrix
                .values
                .chunks(matrix.size)
                .map(|row| row.to_vec())
                .collect()
        };
        RawSimilarityMatrix { rows }
    }
}

impl SimilarityMatrix {
    /// Build from rows; the result must be square, finite and symmetric.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(Error::InvalidArtifact(format!(
                    "similarity row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            values.extend(row);
        }

        if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidArtifact(format!(
                "similarity entry ({}, {}) is not finite",
                bad / size,
                bad % size
            )));
        }

        let matrix = Self { size, values };
        matrix.check_symmetric(SYMMETRY_TOLERANCE)?;
        Ok(matrix)
    }

    fn check_symmetric(&self, tolerance: f32) -> Result<()> {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                let (a, b) = (self.value(i, j), self.value(j, i));
                if (a - b).abs() > tolerance {
                    return Err(Error::InvalidArtifact(format!(
                        "similarity matrix is not symmetric at ({}, {}): {} vs {}",
                        i, j, a, b
                    )));
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn value(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.size + j]
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.size && j < self.size {
            Some(self.value(i, j))
        } else {
            None
        }
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index < self.size {
            Some(&self.values[index * self.size..(index + 1) * self.size])
        } else {
            None
        }
    }
}
