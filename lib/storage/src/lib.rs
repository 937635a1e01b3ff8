//! Artifact persistence for unimatch.
//!
//! Artifacts are produced offline and only ever read by the server. This
//! crate knows their encodings, stamps and verifies checksummed manifests,
//! and assembles them into a checked [`unimatch_core::Recommender`].

pub mod format;
pub mod loader;
pub mod manifest;

pub use format::{read_artifact, write_artifact, ArtifactFormat};
pub use loader::{ArtifactLayout, ArtifactLoader};
pub use manifest::{catalog_fingerprint, file_checksum, ArtifactManifest, FileEntry};
