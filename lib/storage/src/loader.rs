//! Builds a validated [`Recommender`] from an artifact directory.
//!
//! Loading is all-or-nothing: every file is read, checked against the
//! manifest when one exists, and paired with its catalog before the
//! recommender is handed out.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use unimatch_core::{
    Artifacts, Catalog, CategoryRules, CollegeRecord, CourseCategorizer, Error, FacilityAliases,
    Recommender, RecommenderConfig, Result, SimilarityMatrix, TfIdfVectorizer, VectorMatrix,
    VectorizerData,
};

use crate::format::read_artifact;
use crate::manifest::{catalog_fingerprint, ArtifactManifest};

/// File names of each artifact inside the artifact directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactLayout {
    pub catalog: String,
    pub vectorizer: String,
    pub vectors: String,
    pub reference_catalog: String,
    pub similarity: String,
    pub manifest: String,
    pub course_rules: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            catalog: "catalog.json".to_string(),
            vectorizer: "vectorizer.json".to_string(),
            vectors: "vectors.json".to_string(),
            reference_catalog: "reference_catalog.json".to_string(),
            similarity: "similarity.json".to_string(),
            manifest: "manifest.json".to_string(),
            course_rules: "course_rules.json".to_string(),
        }
    }
}

impl ArtifactLayout {
    /// Role name and file of every required artifact
    pub fn required(&self) -> [(&'static str, &str); 5] {
        [
            ("catalog", self.catalog.as_str()),
            ("vectorizer", self.vectorizer.as_str()),
            ("vectors", self.vectors.as_str()),
            ("reference_catalog", self.reference_catalog.as_str()),
            ("similarity", self.similarity.as_str()),
        ]
    }
}

pub struct ArtifactLoader {
    dir: PathBuf,
    layout: ArtifactLayout,
    config: RecommenderConfig,
    aliases: FacilityAliases,
}

impl ArtifactLoader {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            layout: ArtifactLayout::default(),
            config: RecommenderConfig::default(),
            aliases: FacilityAliases::default(),
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: ArtifactLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: RecommenderConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_aliases(mut self, aliases: FacilityAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Read, verify and assemble every artifact
    pub fn load(&self) -> Result<Recommender> {
        let started = Instant::now();
        info!("Loading artifacts from {:?}", self.dir);

        let manifest = self.read_manifest()?;
        if let Some(manifest) = &manifest {
            manifest
                .verify_files(&self.dir)
                .map_err(|e| Error::IncompatibleArtifacts(format!("{:#}", e)))?;
            info!("Verified {} artifact checksums", manifest.files.len());
        } else {
            warn!(
                "No manifest at {:?}; skipping checksum verification",
                self.path(&self.layout.manifest)
            );
        }

        let records: Vec<CollegeRecord> = self.read("catalog", &self.layout.catalog)?;
        let reference: Vec<CollegeRecord> =
            self.read("reference catalog", &self.layout.reference_catalog)?;

        if let Some(manifest) = &manifest {
            check_fingerprint("catalog", manifest.catalog_fingerprint.as_deref(), &records)?;
            check_fingerprint(
                "reference catalog",
                manifest.reference_fingerprint.as_deref(),
                &reference,
            )?;
        }

        let vectorizer_data: VectorizerData = self.read("vectorizer", &self.layout.vectorizer)?;
        let vectorizer = TfIdfVectorizer::from_data(vectorizer_data)?;
        let vectors: VectorMatrix = self.read("vectors", &self.layout.vectors)?;
        let similarity: SimilarityMatrix = self.read("similarity", &self.layout.similarity)?;

        let artifacts = Artifacts {
            catalog: Catalog::with_aliases(records, &self.aliases),
            vectorizer,
            vectors,
            reference: Catalog::with_aliases(reference, &self.aliases),
            similarity,
        };

        let mut recommender = Recommender::new(artifacts, self.config)?;

        let rules_path = self.path(&self.layout.course_rules);
        if rules_path.exists() {
            let rules: CategoryRules = self.read("course rules", &self.layout.course_rules)?;
            info!("Using {} course rules from {:?}", rules.rules.len(), rules_path);
            recommender = recommender.with_categorizer(CourseCategorizer::new(&rules)?);
        }

        info!(
            colleges = recommender.catalog().len(),
            reference = recommender.reference_catalog().len(),
            vocabulary = recommender.vectorizer().vocabulary_size(),
            "Artifacts loaded in {:?}",
            started.elapsed()
        );

        Ok(recommender)
    }

    /// Stamp checksums and catalog fingerprints for the current files and
    /// write the manifest atomically
    pub fn write_manifest(&self) -> Result<ArtifactManifest> {
        self.build_manifest()
            .map_err(|e| Error::Storage(format!("{:#}", e)))
    }

    fn build_manifest(&self) -> anyhow::Result<ArtifactManifest> {
        let mut manifest = ArtifactManifest::new();
        for (role, file) in self.layout.required() {
            manifest.stamp(&self.dir, role, file)?;
        }
        if self.path(&self.layout.course_rules).exists() {
            manifest.stamp(&self.dir, "course_rules", &self.layout.course_rules)?;
        }

        let records: Vec<CollegeRecord> = read_artifact(&self.path(&self.layout.catalog))?;
        let reference: Vec<CollegeRecord> =
            read_artifact(&self.path(&self.layout.reference_catalog))?;
        manifest.catalog_fingerprint = Some(catalog_fingerprint(&records));
        manifest.reference_fingerprint = Some(catalog_fingerprint(&reference));

        let path = self.path(&self.layout.manifest);
        manifest.save(&path)?;
        info!("Wrote manifest with {} files to {:?}", manifest.files.len(), path);
        Ok(manifest)
    }

    fn read_manifest(&self) -> Result<Option<ArtifactManifest>> {
        let path = self.path(&self.layout.manifest);
        if !path.exists() {
            return Ok(None);
        }
        ArtifactManifest::load(&path)
            .map(Some)
            .map_err(|e| Error::Storage(format!("manifest: {:#}", e)))
    }

    fn read<T: serde::de::DeserializeOwned>(&self, what: &str, file: &str) -> Result<T> {
        let path = self.path(file);
        debug!("Reading {} from {:?}", what, path);
        read_artifact(&path)
            .with_context(|| format!("failed to load {}", what))
            .map_err(|e| Error::Storage(format!("{:#}", e)))
    }
}

fn check_fingerprint(what: &str, expected: Option<&str>, records: &[CollegeRecord]) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let actual = catalog_fingerprint(records);
    if actual != expected {
        return Err(Error::IncompatibleArtifacts(format!(
            "{} fingerprint {} does not match manifest {}",
            what, actual, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::write_artifact;
    use ahash::AHashMap;
    use std::fs;
    use tempfile::TempDir;

    fn records() -> Vec<CollegeRecord> {
        let mut a = CollegeRecord::new("alpha institute", "Pune", "Maharashtra");
        a.facilities = vec!["Hostel".to_string(), "Medical/Hospital".to_string()];
        let mut b = CollegeRecord::new("beta institute", "Panaji", "Goa");
        b.facilities = vec!["Library".to_string()];
        vec![a, b]
    }

    fn write_set(dir: &Path) {
        let vocab: AHashMap<String, u32> = ["hostel", "library", "goa", "maharashtra"]
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as u32))
            .collect();
        let vectorizer = TfIdfVectorizer::from_data(VectorizerData::new(vocab, vec![1.0; 4])).unwrap();
        let rows = records()
            .iter()
            .map(|r| vectorizer.transform(&r.descriptor()))
            .collect();

        write_artifact(&dir.join("catalog.json"), &records()).unwrap();
        write_artifact(&dir.join("reference_catalog.json"), &records()).unwrap();
        write_artifact(&dir.join("vectorizer.json"), &vectorizer.to_data()).unwrap();
        write_artifact(&dir.join("vectors.json"), &VectorMatrix::new(4, rows).unwrap()).unwrap();
        write_artifact(
            &dir.join("similarity.json"),
            &SimilarityMatrix::from_rows(vec![vec![1.0, 0.1], vec![0.1, 1.0]]).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_load_without_manifest() {
        let dir = TempDir::new().unwrap();
        write_set(dir.path());

        let recommender = ArtifactLoader::new(dir.path()).load().unwrap();
        assert_eq!(recommender.catalog().len(), 2);
        assert_eq!(
            recommender.catalog().records()[0].facilities,
            vec!["Hostel", "Medical"]
        );
        let neighbors = recommender.recommend_by_college("alpha institute").unwrap();
        assert_eq!(neighbors[0].college_name, "Beta Institute");
    }

    #[test]
    fn test_missing_artifact_is_storage_error() {
        let dir = TempDir::new().unwrap();
        write_set(dir.path());
        fs::remove_file(dir.path().join("vectors.json")).unwrap();

        let err = ArtifactLoader::new(dir.path()).load().err().unwrap();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("vectors"));
    }

    #[test]
    fn test_manifest_detects_tampering() {
        let dir = TempDir::new().unwrap();
        write_set(dir.path());

        let loader = ArtifactLoader::new(dir.path());
        let manifest = loader.write_manifest().unwrap();
        assert_eq!(manifest.files.len(), 5);
        assert!(loader.load().is_ok());

        write_artifact(
            &dir.path().join("similarity.json"),
            &SimilarityMatrix::from_rows(vec![vec![1.0, 0.9], vec![0.9, 1.0]]).unwrap(),
        )
        .unwrap();
        assert!(matches!(loader.load(), Err(Error::IncompatibleArtifacts(_))));
    }

    #[test]
    fn test_fingerprint_mismatch() {
        let dir = TempDir::new().unwrap();
        write_set(dir.path());

        let loader = ArtifactLoader::new(dir.path());
        let mut manifest = loader.write_manifest().unwrap();
        manifest.files.clear();
        manifest.reference_fingerprint = Some("0".repeat(64));
        manifest.save(&dir.path().join("manifest.json")).unwrap();

        assert!(matches!(loader.load(), Err(Error::IncompatibleArtifacts(_))));
    }

    #[test]
    fn test_course_rules_override() {
        let dir = TempDir::new().unwrap();
        write_set(dir.path());
        let mut catalog = records();
        catalog[0].courses = vec!["DPhil Economics".to_string()];
        write_artifact(&dir.path().join("catalog.json"), &catalog).unwrap();
        fs::write(
            dir.path().join("course_rules.json"),
            r#"{"rules": [{"category": "doctoral", "when": {"any_pattern": ["dphil"]}}]}"#,
        )
        .unwrap();

        let recommender = ArtifactLoader::new(dir.path()).load().unwrap();
        let options = recommender.options();
        assert_eq!(
            options.courses[&unimatch_core::CourseCategory::Doctoral],
            vec!["DPhil Economics"]
        );
    }

    #[test]
    fn test_custom_layout_with_binary_matrices() {
        let dir = TempDir::new().unwrap();
        write_set(dir.path());
        let similarity: SimilarityMatrix =
            read_artifact(&dir.path().join("similarity.json")).unwrap();
        write_artifact(&dir.path().join("similarity.bin"), &similarity).unwrap();

        let layout = ArtifactLayout {
            similarity: "similarity.bin".to_string(),
            ..Default::default()
        };
        let recommender = ArtifactLoader::new(dir.path())
            .with_layout(layout)
            .with_config(RecommenderConfig {
                neighbor_limit: 1,
                ..Default::default()
            })
            .load()
            .unwrap();
        assert_eq!(recommender.recommend_by_college("beta institute").unwrap().len(), 1);
    }
}
