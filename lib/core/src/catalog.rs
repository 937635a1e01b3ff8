use crate::query::{COLLEGE_TYPE_OPTIONS, ESTABLISHMENT_OPTIONS, FEE_OPTIONS, GENDER_OPTIONS};
use crate::{CollegeId, CollegeRecord, CourseCategorizer, CourseCategory};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Facility label substitutions applied once when a catalog is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityAliases {
    pub replacements: Vec<(String, String)>,
}

impl Default for FacilityAliases {
    fn default() -> Self {
        Self {
            replacements: vec![("Medical/Hospital".to_string(), "Medical".to_string())],
        }
    }
}

impl FacilityAliases {
    pub fn none() -> Self {
        Self { replacements: Vec::new() }
    }

    /// Apply every substitution in order
    pub fn canonicalize(&self, facility: &str) -> String {
        self.replacements
            .iter()
            .fold(facility.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
    }
}

/// An immutable, ordered snapshot of college records.
///
/// Row order is the linkage to matrix rows and never changes after
/// construction. Names are looked up through a convenience index that
/// resolves duplicates to the first row.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<CollegeRecord>,
    by_name: AHashMap<String, CollegeId>,
}

impl Catalog {
    /// Build with the default facility substitutions
    pub fn new(records: Vec<CollegeRecord>) -> Self {
        Self::with_aliases(records, &FacilityAliases::default())
    }

    pub fn with_aliases(mut records: Vec<CollegeRecord>, aliases: &FacilityAliases) -> Self {
        for record in &mut records {
            for facility in &mut record.facilities {
                *facility = aliases.canonicalize(facility);
            }
        }

        let mut by_name = AHashMap::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            by_name
                .entry(record.name.clone())
                .or_insert(CollegeId::new(row as u32));
        }

        Self { records, by_name }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn records(&self) -> &[CollegeRecord] {
        &self.records
    }

    #[inline]
    pub fn get(&self, id: CollegeId) -> Option<&CollegeRecord> {
        self.records.get(id.row())
    }

    /// First record carrying exactly this name
    #[inline]
    pub fn find(&self, name: &str) -> Option<CollegeId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CollegeId, &CollegeRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| (CollegeId::new(row as u32), record))
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn unique_courses(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| r.courses.iter().map(String::as_str))
            .collect()
    }

    pub fn unique_facilities(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| r.facilities.iter().map(String::as_str))
            .collect()
    }

    /// State -> every city seen under it. Every state a record lists gets
    /// a key, but its cities are filed under the first state only.
    pub fn location_index(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in &self.records {
            for state in record.state.values() {
                index.entry(state.to_string()).or_default();
            }
            if let Some(state) = record.state.primary() {
                index
                    .entry(state.to_string())
                    .or_default()
                    .extend(record.city.values().into_iter().map(str::to_string));
            }
        }
        index
    }

    /// Everything a preference form needs to offer its choices
    pub fn options(&self, categorizer: &CourseCategorizer) -> CatalogOptions {
        CatalogOptions {
            courses: categorizer.group(self.unique_courses()),
            facilities: self.unique_facilities().into_iter().map(str::to_string).collect(),
            locations: self
                .location_index()
                .into_iter()
                .map(|(state, cities)| (state, cities.into_iter().collect()))
                .collect(),
            fees: FEE_OPTIONS.iter().map(|s| s.to_string()).collect(),
            college_types: COLLEGE_TYPE_OPTIONS.iter().map(|s| s.to_string()).collect(),
            establishments: ESTABLISHMENT_OPTIONS.iter().map(|s| s.to_string()).collect(),
            genders: GENDER_OPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Choices derived from a catalog for the preference form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogOptions {
    pub courses: BTreeMap<CourseCategory, Vec<String>>,
    pub facilities: Vec<String>,
    pub locations: BTreeMap<String, Vec<String>>,
    pub fees: Vec<String>,
    pub college_types: Vec<String>,
    pub establishments: Vec<String>,
    pub genders: Vec<String>,
}
