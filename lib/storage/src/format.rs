// Artifact encodings, picked by file extension
use anyhow::{anyhow, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// On-disk encoding of an artifact.
///
/// Bincode is not self-describing, so it only suits the matrices and the
/// vectorizer; catalogs (whose city/state fields accept several shapes)
/// must be JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    JsonGz,
    Bincode,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("artifact path has no file name: {:?}", path))?;

        if name.ends_with(".json.gz") {
            Ok(ArtifactFormat::JsonGz)
        } else if name.ends_with(".json") {
            Ok(ArtifactFormat::Json)
        } else if name.ends_with(".bin") {
            Ok(ArtifactFormat::Bincode)
        } else {
            Err(anyhow!(
                "unsupported artifact extension for '{}' (expected .json, .json.gz or .bin)",
                name
            ))
        }
    }
}

pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ArtifactFormat::from_path(path)?;
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);

    let value = match format {
        ArtifactFormat::Json => serde_json::from_reader(reader)?,
        ArtifactFormat::JsonGz => {
            let mut decoder = GzDecoder::new(reader);
            let mut json_data = Vec::new();
            decoder.read_to_end(&mut json_data)?;
            serde_json::from_slice(&json_data)?
        }
        ArtifactFormat::Bincode => {
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            bincode::deserialize(&data)?
        }
    };

    Ok(value)
}

/// Serialize and replace `path` atomically
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = match ArtifactFormat::from_path(path)? {
        ArtifactFormat::Json => serde_json::to_vec_pretty(value)?,
        ArtifactFormat::JsonGz => {
            let json_data = serde_json::to_vec(value)?;
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&json_data)?;
            encoder.finish()?
        }
        ArtifactFormat::Bincode => bincode::serialize(value)?,
    };

    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(&bytes))
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use unimatch_core::SimilarityMatrix;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ArtifactFormat::from_path(Path::new("a/catalog.json")).unwrap(),
            ArtifactFormat::Json
        );
        assert_eq!(
            ArtifactFormat::from_path(Path::new("vectors.json.gz")).unwrap(),
            ArtifactFormat::JsonGz
        );
        assert_eq!(
            ArtifactFormat::from_path(Path::new("similarity.bin")).unwrap(),
            ArtifactFormat::Bincode
        );
        assert!(ArtifactFormat::from_path(Path::new("similarity.pkl")).is_err());
    }

    #[test]
    fn test_every_format_reads_back() {
        let dir = TempDir::new().unwrap();
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0, 0.25], vec![0.25, 1.0]]).unwrap();

        for name in ["m.json", "m.json.gz", "m.bin"] {
            let path = dir.path().join(name);
            write_artifact(&path, &matrix).unwrap();
            let back: SimilarityMatrix = read_artifact(&path).unwrap();
            assert_eq!(back.get(0, 1), Some(0.25), "format {}", name);
        }
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result: Result<SimilarityMatrix> = read_artifact(&dir.path().join("missing.json"));
        assert!(result.is_err());
    }
}
