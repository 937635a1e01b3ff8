use serde::{Deserialize, Serialize};

/// Surrogate identifier of a record: its row within the catalog it was
/// loaded from. Stable for the lifetime of that catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollegeId(u32);

impl CollegeId {
    #[inline]
    #[must_use]
    pub fn new(row: u32) -> Self {
        Self(row)
    }

    #[inline]
    pub fn row(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CollegeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// City or state as found in upstream data: either a plain string or a
/// list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Single(String),
    Many(Vec<String>),
}

impl Default for Location {
    fn default() -> Self {
        Location::Single(String::new())
    }
}

impl Location {
    /// First value, used wherever a single location is needed
    pub fn primary(&self) -> Option<&str> {
        match self {
            Location::Single(s) => Some(s.as_str()).filter(|s| !s.is_empty()),
            Location::Many(values) => values.first().map(String::as_str),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Location::Single(s) if s.is_empty() => Vec::new(),
            Location::Single(s) => vec![s.as_str()],
            Location::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Display form: all values joined by ", "
    pub fn display(&self) -> String {
        self.values().join(", ")
    }
}

impl From<&str> for Location {
    fn from(s: &str) -> Self {
        Location::Single(s.to_string())
    }
}

/// One college of a catalog snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollegeRecord {
    #[serde(alias = "College Name")]
    pub name: String,
    #[serde(default, alias = "City")]
    pub city: Location,
    #[serde(default, alias = "State")]
    pub state: Location,
    #[serde(default, alias = "Courses")]
    pub courses: Vec<String>,
    #[serde(default, alias = "Facilities")]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub fees: String,
    #[serde(default)]
    pub college_type: String,
    #[serde(default)]
    pub establishment: String,
    #[serde(default)]
    pub gender: String,
    /// Descriptive text the vector row was built from, when shipped
    #[serde(default, alias = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl CollegeRecord {
    pub fn new(name: impl Into<String>, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: Location::Single(city.into()),
            state: Location::Single(state.into()),
            ..Default::default()
        }
    }

    /// Normal-form text of this record. Stored tags win; otherwise the
    /// attributes are run through the same normalizer as queries.
    pub fn descriptor(&self) -> String {
        match &self.tags {
            Some(tags) => tags.clone(),
            None => crate::PreferenceQuery::from(self).normalized(),
        }
    }
}
