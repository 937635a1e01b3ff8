// Checksummed record of an artifact set
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use unimatch_core::CollegeRecord;

use crate::format::{read_artifact, write_artifact};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the artifact directory
    pub path: String,
    pub sha256: String,
    pub size: u64,
}

/// Describes one consistent set of artifacts.
///
/// Checksums pin every file; the fingerprints pin which catalog rows each
/// matrix was built from, so a catalog swapped for another with the same
/// length is still caught.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    /// Role name -> file entry
    pub files: BTreeMap<String, FileEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_fingerprint: Option<String>,
}

impl ArtifactManifest {
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            created_at: Utc::now(),
            files: BTreeMap::new(),
            catalog_fingerprint: None,
            reference_fingerprint: None,
        }
    }

    /// Checksum `relative` under `dir` and record it for `role`
    pub fn stamp(&mut self, dir: &Path, role: &str, relative: &str) -> Result<()> {
        let (sha256, size) = file_checksum(&dir.join(relative))?;
        self.files.insert(
            role.to_string(),
            FileEntry {
                path: relative.to_string(),
                sha256,
                size,
            },
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let manifest: Self = read_artifact(path)?;
        if manifest.version != MANIFEST_VERSION {
            return Err(anyhow!(
                "unsupported manifest version {} (expected {})",
                manifest.version,
                MANIFEST_VERSION
            ));
        }
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_artifact(path, self)
    }

    /// Re-checksum every listed file and fail on the first mismatch
    pub fn verify_files(&self, dir: &Path) -> Result<()> {
        for (role, entry) in &self.files {
            let (actual, size) = file_checksum(&dir.join(&entry.path))
                .with_context(|| format!("manifest entry '{}'", role))?;
            if actual != entry.sha256 || size != entry.size {
                return Err(anyhow!(
                    "checksum mismatch for {} ({}): expected {}, got {}",
                    role,
                    entry.path,
                    entry.sha256,
                    actual
                ));
            }
            debug!(role = %role, path = %entry.path, "Checksum verified");
        }
        Ok(())
    }
}

impl Default for ArtifactManifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Hex sha256 and byte size of a file
pub fn file_checksum(path: &Path) -> Result<(String, u64)> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {:?}", path))?;
    Ok((format!("{:x}", Sha256::digest(&bytes)), bytes.len() as u64))
}

/// Order-sensitive digest over the identifying columns of every row
pub fn catalog_fingerprint(records: &[CollegeRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        hasher.update(record.name.as_bytes());
        hasher.update(b"\t");
        hasher.update(record.city.display().as_bytes());
        hasher.update(b"\t");
        hasher.update(record.state.display().as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
