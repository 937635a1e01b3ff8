//! The serving context and its two operations.
//!
//! A [`Recommender`] owns every loaded artifact. It is built once, checked
//! for consistency, and then only read, so it can be shared across threads
//! behind an `Arc` without locking.

use crate::ranking::{round_score, top_k};
use crate::text::title_case;
use crate::{
    Catalog, CatalogOptions, CollegeId, CollegeRecord, CourseCategorizer, Error,
    PreferenceQuery, Result, SimilarityMatrix, TfIdfVectorizer, VectorMatrix,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Limits applied to both operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Results returned by the preference mode
    pub preference_limit: usize,
    /// Results returned by the college mode
    pub neighbor_limit: usize,
    /// Decimal places kept on reported similarity scores
    pub score_decimals: u32,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            preference_limit: 20,
            neighbor_limit: 10,
            score_decimals: 3,
        }
    }
}

/// Everything loaded from disk, before validation
pub struct Artifacts {
    /// Catalog the vector rows were built from
    pub catalog: Catalog,
    pub vectorizer: TfIdfVectorizer,
    pub vectors: VectorMatrix,
    /// Catalog the similarity matrix was built from
    pub reference: Catalog,
    pub similarity: SimilarityMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecommendation {
    pub college_name: String,
    pub city: String,
    pub state: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollegeRecommendation {
    pub college_name: String,
    pub city: String,
    pub state: String,
}

pub struct Recommender {
    config: RecommenderConfig,
    catalog: Catalog,
    vectorizer: TfIdfVectorizer,
    vectors: VectorMatrix,
    reference: Catalog,
    similarity: SimilarityMatrix,
    categorizer: CourseCategorizer,
}

impl Recommender {
    /// Take ownership of the artifacts after checking that each matrix
    /// lines up with the catalog it is paired with.
    pub fn new(artifacts: Artifacts, config: RecommenderConfig) -> Result<Self> {
        let Artifacts {
            catalog,
            vectorizer,
            vectors,
            reference,
            similarity,
        } = artifacts;

        if vectors.len() != catalog.len() {
            return Err(Error::IncompatibleArtifacts(format!(
                "vector matrix has {} rows but catalog has {} records",
                vectors.len(),
                catalog.len()
            )));
        }

        if vectors.n_features() != vectorizer.vocabulary_size() {
            return Err(Error::IncompatibleArtifacts(format!(
                "vector matrix has {} features but vectorizer vocabulary has {} terms",
                vectors.n_features(),
                vectorizer.vocabulary_size()
            )));
        }

        if similarity.size() != reference.len() {
            return Err(Error::IncompatibleArtifacts(format!(
                "similarity matrix is {}x{} but reference catalog has {} records",
                similarity.size(),
                similarity.size(),
                reference.len()
            )));
        }

        Ok(Self {
            config,
            catalog,
            vectorizer,
            vectors,
            reference,
            similarity,
            categorizer: CourseCategorizer::default(),
        })
    }

    /// Replace the built-in course rules used by [`Recommender::options`]
    #[must_use]
    pub fn with_categorizer(mut self, categorizer: CourseCategorizer) -> Self {
        self.categorizer = categorizer;
        self
    }

    #[inline]
    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    pub fn reference_catalog(&self) -> &Catalog {
        &self.reference
    }

    #[inline]
    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    #[inline]
    pub fn categorizer(&self) -> &CourseCategorizer {
        &self.categorizer
    }

    /// Form choices derived from the preference catalog
    pub fn options(&self) -> CatalogOptions {
        self.catalog.options(&self.categorizer)
    }

    /// Rank the catalog against a preference query
    pub fn recommend_by_preferences(
        &self,
        query: &PreferenceQuery,
    ) -> Result<Vec<PreferenceRecommendation>> {
        let text = query.normalized();
        let query_vector = self.vectorizer.transform(&text);

        if let Some(max) = query_vector.max_index() {
            if max as usize >= self.vectors.n_features() {
                return Err(Error::InvalidDimension {
                    expected: self.vectors.n_features(),
                    actual: max as usize + 1,
                });
            }
        }

        debug!(
            query = %text,
            terms = query_vector.nnz(),
            "Scoring preference query"
        );

        let scores = self.vectors.cosine_scores(&query_vector);
        let ranked = top_k(scores.into_iter().enumerate(), self.config.preference_limit);

        ranked
            .into_iter()
            .map(|hit| {
                let record = record_at(&self.catalog, hit.index)?;
                Ok(PreferenceRecommendation {
                    college_name: record.name.clone(),
                    city: record.city.display(),
                    state: record.state.display(),
                    similarity: round_score(hit.score, self.config.score_decimals),
                })
            })
            .collect()
    }

    /// Colleges most similar to `college_name` in the reference catalog
    pub fn recommend_by_college(&self, college_name: &str) -> Result<Vec<CollegeRecommendation>> {
        let id = self
            .reference
            .find(college_name)
            .ok_or_else(|| Error::CollegeNotFound(college_name.to_string()))?;
        let row = self.similarity.row(id.row()).ok_or_else(|| {
            Error::InvalidArtifact(format!("no similarity row for reference record {}", id))
        })?;

        debug!(college = college_name, row = id.row(), "Looking up neighbors");

        let others = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(column, _)| *column != id.row());

        top_k(others, self.config.neighbor_limit)
            .into_iter()
            .map(|hit| {
                let record = record_at(&self.reference, hit.index)?;
                Ok(CollegeRecommendation {
                    college_name: title_case(&record.name),
                    city: record.city.display(),
                    state: record.state.display(),
                })
            })
            .collect()
    }
}

fn record_at(catalog: &Catalog, index: usize) -> Result<&CollegeRecord> {
    catalog
        .get(CollegeId::new(index as u32))
        .ok_or_else(|| {
            Error::InvalidArtifact(format!(
                "row {} is outside a catalog of {} records",
                index,
                catalog.len()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SparseVector, VectorizerData};
    use ahash::AHashMap;

    const TERMS: [&str; 6] = ["ailab", "hostel", "high", "low", "fees", "goa"];

    fn vectorizer() -> TfIdfVectorizer {
        let vocab: AHashMap<String, u32> = TERMS
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as u32))
            .collect();
        TfIdfVectorizer::from_data(VectorizerData::new(vocab, vec![1.0; TERMS.len()])).unwrap()
    }

    fn college(name: &str, facilities: &[&str], fees: &str) -> CollegeRecord {
        let mut record = CollegeRecord::new(name, "Panaji", "Goa");
        record.facilities = facilities.iter().map(|f| f.to_string()).collect();
        record.fees = fees.to_string();
        record
    }

    fn artifacts(records: Vec<CollegeRecord>, similarity: Vec<Vec<f32>>) -> Artifacts {
        let vectorizer = vectorizer();
        let rows: Vec<SparseVector> = records
            .iter()
            .map(|r| vectorizer.transform(&r.descriptor()))
            .collect();
        let catalog = Catalog::new(records);
        Artifacts {
            vectors: VectorMatrix::new(TERMS.len(), rows).unwrap(),
            reference: catalog.clone(),
            catalog,
            vectorizer,
            similarity: SimilarityMatrix::from_rows(similarity).unwrap(),
        }
    }

    fn three_colleges() -> Recommender {
        let records = vec![
            college("alpha college", &["Hostel"], "Low Fees"),
            college("beta college", &["AI Lab"], "High Fees"),
            college("gamma college", &["AI Lab", "Hostel"], "High Fees"),
        ];
        let similarity = vec![
            vec![1.0, 0.2, 0.6],
            vec![0.2, 1.0, 0.6],
            vec![0.6, 0.6, 1.0],
        ];
        Recommender::new(artifacts(records, similarity), RecommenderConfig::default()).unwrap()
    }

    #[test]
    fn test_preferences_rank_best_match_first() {
        let recommender = three_colleges();
        let query = PreferenceQuery {
            facilities: vec!["AI Lab".to_string()],
            fees: "High Fees".to_string(),
            ..Default::default()
        };

        let results = recommender.recommend_by_preferences(&query).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].college_name, "beta college");
        assert_eq!(results[0].city, "Panaji");
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
    }

    #[test]
    fn test_preferences_scores_are_rounded() {
        let recommender = three_colleges();
        let query = PreferenceQuery {
            facilities: vec!["Hostel".to_string()],
            ..Default::default()
        };

        for result in recommender.recommend_by_preferences(&query).unwrap() {
            let scaled = result.similarity * 1000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_empty_query_ranks_by_row() {
        let recommender = three_colleges();
        let results = recommender
            .recommend_by_preferences(&PreferenceQuery::default())
            .unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.college_name.as_str()).collect();
        assert_eq!(names, vec!["alpha college", "beta college", "gamma college"]);
        assert!(results.iter().all(|r| r.similarity == 0.0));
    }

    #[test]
    fn test_preference_limit() {
        let records: Vec<CollegeRecord> = (0..25)
            .map(|i| college(&format!("college {}", i), &["Hostel"], "Low Fees"))
            .collect();
        let mut similarity = vec![vec![0.0; 25]; 25];
        for (i, row) in similarity.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        let recommender =
            Recommender::new(artifacts(records, similarity), RecommenderConfig::default()).unwrap();

        let query = PreferenceQuery {
            facilities: vec!["Hostel".to_string()],
            ..Default::default()
        };
        assert_eq!(recommender.config().preference_limit, 20);
        assert_eq!(recommender.config().neighbor_limit, 10);
        let results = recommender.recommend_by_preferences(&query).unwrap();
        assert_eq!(results.len(), 20);
        // identical rows tie, so row order decides
        assert_eq!(results[0].college_name, "college 0");
        assert_eq!(results[19].college_name, "college 19");

        let neighbors = recommender.recommend_by_college("college 3").unwrap();
        assert_eq!(neighbors.len(), 10);
        assert_eq!(neighbors[0].college_name, "College 0");
        assert!(neighbors.iter().all(|n| n.college_name != "College 3"));
    }

    #[test]
    fn test_college_mode_excludes_self_and_title_cases() {
        let recommender = three_colleges();
        let results = recommender.recommend_by_college("alpha college").unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.college_name.as_str()).collect();
        assert_eq!(names, vec!["Gamma College", "Beta College"]);
        assert_eq!(results[0].state, "Goa");
    }

    #[test]
    fn test_college_mode_ties_prefer_lower_column() {
        let recommender = three_colleges();
        let results = recommender.recommend_by_college("gamma college").unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.college_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha College", "Beta College"]);
    }

    #[test]
    fn test_college_mode_is_idempotent() {
        let recommender = three_colleges();
        let first = recommender.recommend_by_college("beta college").unwrap();
        let second = recommender.recommend_by_college("beta college").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_college_is_not_found() {
        let recommender = three_colleges();
        let err = recommender
            .recommend_by_college("Nonexistent University")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_options_use_configured_categorizer() {
        let mut record = college("alpha college", &[], "Low Fees");
        record.courses = vec!["DPhil Economics".to_string()];
        let recommender =
            Recommender::new(artifacts(vec![record], vec![vec![1.0]]), RecommenderConfig::default())
                .unwrap();
        assert_eq!(
            recommender.options().courses[&crate::CourseCategory::Other],
            vec!["DPhil Economics"]
        );

        let rules: crate::CategoryRules = serde_json::from_str(
            r#"{"rules": [{"category": "doctoral", "when": {"any_pattern": ["dphil"]}}]}"#,
        )
        .unwrap();
        let recommender = recommender.with_categorizer(CourseCategorizer::new(&rules).unwrap());
        assert_eq!(
            recommender.categorizer().categorize("DPhil Economics"),
            crate::CourseCategory::Doctoral
        );
        assert_eq!(
            recommender.options().courses[&crate::CourseCategory::Doctoral],
            vec!["DPhil Economics"]
        );
    }

    #[test]
    fn test_mismatched_vector_rows_rejected() {
        let mut parts = artifacts(
            vec![college("a", &[], ""), college("b", &[], "")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        );
        parts.catalog = Catalog::new(vec![college("a", &[], "")]);
        assert!(matches!(
            Recommender::new(parts, RecommenderConfig::default()),
            Err(Error::IncompatibleArtifacts(_))
        ));
    }

    #[test]
    fn test_mismatched_similarity_rejected() {
        let mut parts = artifacts(
            vec![college("a", &[], ""), college("b", &[], "")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        );
        parts.similarity = SimilarityMatrix::from_rows(vec![vec![1.0]]).unwrap();
        assert!(matches!(
            Recommender::new(parts, RecommenderConfig::default()),
            Err(Error::IncompatibleArtifacts(_))
        ));
    }

    #[test]
    fn test_mismatched_vocabulary_rejected() {
        let mut parts = artifacts(vec![college("a", &[], "")], vec![vec![1.0]]);
        parts.vectors = VectorMatrix::new(2, vec![SparseVector::empty()]).unwrap();
        assert!(matches!(
            Recommender::new(parts, RecommenderConfig::default()),
            Err(Error::IncompatibleArtifacts(_))
        ));
    }
}
