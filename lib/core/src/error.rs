use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Message reported when a college-mode lookup misses the reference catalog
pub const COLLEGE_NOT_FOUND: &str = "College not found in database";

#[derive(Error, Debug)]
pub enum Error {
    #[error("College not found in database: {0}")]
    CollegeNotFound(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Incompatible artifacts: {0}")]
    IncompatibleArtifacts(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("Invalid course pattern: {0}")]
    InvalidPattern(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this is the lookup miss of the college mode. Every other
    /// variant is an internal failure.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::CollegeNotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
