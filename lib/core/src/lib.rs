//! # unimatch Core
//!
//! Core library for the unimatch college recommender.
//!
//! This crate provides the data model and the similarity ranking engine:
//!
//! - [`Catalog`] - Ordered, immutable snapshot of [`CollegeRecord`]s
//! - [`TfIdfVectorizer`] - Fitted TF-IDF weighting over a fixed vocabulary
//! - [`VectorMatrix`] - Sparse TF-IDF rows aligned with a catalog
//! - [`SimilarityMatrix`] - Precomputed pairwise college similarity
//! - [`PreferenceQuery`] - User preferences and their normal form
//! - [`CourseCategorizer`] - Rule-driven course title classification
//! - [`Recommender`] - Serving context for both recommendation modes
//!
//! ## Example
//!
//! ```rust
//! use unimatch_core::*;
//! use ahash::AHashMap;
//!
//! let vocabulary: AHashMap<String, u32> =
//!     [("hostel".to_string(), 0), ("goa".to_string(), 1)].into_iter().collect();
//! let vectorizer = TfIdfVectorizer::from_data(VectorizerData::new(vocabulary, vec![1.0, 1.0])).unwrap();
//!
//! let mut record = CollegeRecord::new("Sea View College", "Panaji", "Goa");
//! record.facilities = vec!["Hostel".to_string()];
//! let rows = vec![vectorizer.transform(&record.descriptor())];
//!
//! let catalog = Catalog::new(vec![record]);
//! let artifacts = Artifacts {
//!     reference: catalog.clone(),
//!     catalog,
//!     vectorizer,
//!     vectors: VectorMatrix::new(2, rows).unwrap(),
//!     similarity: SimilarityMatrix::from_rows(vec![vec![1.0]]).unwrap(),
//! };
//! let recommender = Recommender::new(artifacts, RecommenderConfig::default()).unwrap();
//!
//! let query = PreferenceQuery { state: "Goa".to_string(), ..Default::default() };
//! let results = recommender.recommend_by_preferences(&query).unwrap();
//! assert_eq!(results[0].college_name, "Sea View College");
//! ```

pub mod catalog;
pub mod college;
pub mod courses;
pub mod error;
pub mod matrix;
pub mod query;
pub mod ranking;
pub mod recommender;
pub mod text;
pub mod vector;
pub mod vectorizer;

pub use catalog::{Catalog, CatalogOptions, FacilityAliases};
pub use college::{CollegeId, CollegeRecord, Location};
pub use courses::{CategoryRule, CategoryRules, Condition, CourseCategorizer, CourseCategory};
pub use error::{Error, Result, COLLEGE_NOT_FOUND};
pub use matrix::{SimilarityMatrix, VectorMatrix};
pub use query::PreferenceQuery;
pub use recommender::{
    Artifacts, CollegeRecommendation, PreferenceRecommendation, Recommender, RecommenderConfig,
};
pub use vector::SparseVector;
pub use vectorizer::{Norm, TfIdfVectorizer, VectorizerData};
