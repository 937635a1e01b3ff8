//! # unimatch
//!
//! A college recommender built on TF-IDF similarity.
//!
//! unimatch answers two questions from precomputed artifacts:
//!
//! - **Preferences**: given courses, facilities, fees, type, establishment,
//!   gender and state, which colleges match best? The preferences are
//!   normalized into text, projected with a fitted TF-IDF vectorizer and
//!   ranked by cosine similarity against every college.
//! - **Similar colleges**: given a college name, which colleges sit closest
//!   to it in the precomputed similarity matrix?
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! unimatch --artifact-dir ./artifacts --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use unimatch::prelude::*;
//!
//! let recommender = ArtifactLoader::new("./artifacts").load().unwrap();
//!
//! let query = PreferenceQuery {
//!     courses: vec!["Data Science".to_string()],
//!     facilities: vec!["AI Lab".to_string()],
//!     state: "Karnataka".to_string(),
//!     ..Default::default()
//! };
//! for rec in recommender.recommend_by_preferences(&query).unwrap() {
//!     println!("{} ({}, {}) {}", rec.college_name, rec.city, rec.state, rec.similarity);
//! }
//!
//! let neighbors = recommender.recommend_by_college("Example Institute Of Technology");
//! ```
//!
//! ## Crate Structure
//!
//! - `unimatch-core` - Catalog, vectorizer, matrices, query normalization,
//!   course categories and the [`Recommender`]
//! - `unimatch-storage` - Artifact formats, manifests and the loader
//! - `unimatch-api` - REST API

// Re-export core types
pub use unimatch_core::{
    Artifacts, Catalog, CatalogOptions, CategoryRules, CollegeId, CollegeRecommendation,
    CollegeRecord, CourseCategorizer, CourseCategory, Error, Location, PreferenceQuery,
    PreferenceRecommendation, Recommender, RecommenderConfig, Result, SimilarityMatrix,
    SparseVector, TfIdfVectorizer, VectorMatrix, VectorizerData,
};

// Re-export storage
pub use unimatch_storage::{ArtifactLayout, ArtifactLoader, ArtifactManifest};

// Re-export API
pub use unimatch_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArtifactLayout, ArtifactLoader, Catalog, CollegeRecommendation, CollegeRecord, Error,
        PreferenceQuery, PreferenceRecommendation, Recommender, RecommenderConfig, RestApi,
        Result,
    };
}

/// Artifact encodings, for tools that produce artifacts
pub mod artifacts {
    pub use unimatch_storage::{catalog_fingerprint, read_artifact, write_artifact, ArtifactFormat};
}
