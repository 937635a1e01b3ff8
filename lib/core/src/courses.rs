//! Course title classification.
//!
//! Titles are sorted into a fixed set of degree buckets by an ordered list
//! of rules. Each rule pairs a [`Condition`] over regex pattern families
//! with the category it assigns; the first rule that holds wins and titles
//! matching no rule fall into [`CourseCategory::Other`]. Rules are plain
//! data so they can be shipped as JSON next to the catalog.
//!
//! Classification only shapes how course choices are grouped for display.
//! It plays no part in scoring.

use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseCategory {
    Integrated,
    BachelorEngineering,
    MasterEngineering,
    BachelorScience,
    MasterScience,
    ComputerApplications,
    Doctoral,
    Diploma,
    Other,
}

impl CourseCategory {
    pub const ALL: [CourseCategory; 9] = [
        CourseCategory::Integrated,
        CourseCategory::BachelorEngineering,
        CourseCategory::MasterEngineering,
        CourseCategory::BachelorScience,
        CourseCategory::MasterScience,
        CourseCategory::ComputerApplications,
        CourseCategory::Doctoral,
        CourseCategory::Diploma,
        CourseCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CourseCategory::Integrated => "integrated",
            CourseCategory::BachelorEngineering => "bachelor-engineering",
            CourseCategory::MasterEngineering => "master-engineering",
            CourseCategory::BachelorScience => "bachelor-science",
            CourseCategory::MasterScience => "master-science",
            CourseCategory::ComputerApplications => "computer-applications",
            CourseCategory::Doctoral => "doctoral",
            CourseCategory::Diploma => "diploma",
            CourseCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const BACHELOR_ENGINEERING: &[&str] = &[
    r"\bb[\.\s]*tech\b",
    r"\bb[\.\s]*e\b",
    r"bachelor\s+of\s+technology",
    r"bachelor\s+of\s+engineering",
];

const MASTER_ENGINEERING: &[&str] = &[
    r"\bm[\.\s]*tech\b",
    r"\bm[\.\s]*e\b",
    r"master\s+of\s+technology",
    r"master\s+of\s+engineering",
];

const BACHELOR_SCIENCE: &[&str] = &[r"\bb[\.\s]*sc\b", r"bachelor\s+of\s+science"];

const MASTER_SCIENCE: &[&str] = &[r"\bm[\.\s]*sc\b", r"master\s+of\s+science"];

const COMPUTER_APPLICATIONS: &[&str] = &[
    r"\bbca\b",
    r"\bmca\b",
    r"bachelor\s+of\s+computer\s+applications",
    r"master\s+of\s+computer\s+applications",
];

const DOCTORAL: &[&str] = &[r"\bph\.?d\b", r"doctor\s+of\s+philosophy"];

const DIPLOMA: &[&str] = &[r"\bdiploma\b", r"\bpolytechnic\b", r"pg\s*diploma"];

/// Predicate over a course title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// At least one of the patterns matches (case-insensitive)
    AnyPattern(Vec<String>),
    /// Every nested condition holds
    All(Vec<Condition>),
    /// At least one nested condition holds
    Any(Vec<Condition>),
}

impl Condition {
    fn patterns(patterns: &[&str]) -> Self {
        Condition::AnyPattern(patterns.iter().map(|p| p.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: CourseCategory,
    pub when: Condition,
}

/// Ordered rule list; earlier rules take priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRules {
    pub rules: Vec<CategoryRule>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        let bachelor_engineering = Condition::patterns(BACHELOR_ENGINEERING);
        let master_engineering = Condition::patterns(MASTER_ENGINEERING);

        // "integrated" next to either engineering degree, or both degrees
        // named in one title
        let integrated = Condition::Any(vec![
            Condition::All(vec![
                Condition::patterns(&["integrated"]),
                Condition::Any(vec![bachelor_engineering.clone(), master_engineering.clone()]),
            ]),
            Condition::All(vec![bachelor_engineering.clone(), master_engineering.clone()]),
        ]);

        let rule = |category, when| CategoryRule { category, when };

        Self {
            rules: vec![
                rule(CourseCategory::Integrated, integrated),
                rule(CourseCategory::BachelorEngineering, bachelor_engineering),
                rule(CourseCategory::MasterEngineering, master_engineering),
                rule(CourseCategory::BachelorScience, Condition::patterns(BACHELOR_SCIENCE)),
                rule(CourseCategory::MasterScience, Condition::patterns(MASTER_SCIENCE)),
                rule(
                    CourseCategory::ComputerApplications,
                    Condition::patterns(COMPUTER_APPLICATIONS),
                ),
                rule(CourseCategory::Doctoral, Condition::patterns(DOCTORAL)),
                rule(CourseCategory::Diploma, Condition::patterns(DIPLOMA)),
            ],
        }
    }
}

#[derive(Debug, Clone)]
enum CompiledCondition {
    AnyPattern(Vec<Regex>),
    All(Vec<CompiledCondition>),
    Any(Vec<CompiledCondition>),
}

impl CompiledCondition {
    fn compile(condition: &Condition) -> Result<Self> {
        Ok(match condition {
            Condition::AnyPattern(patterns) => CompiledCondition::AnyPattern(
                patterns
                    .iter()
                    .map(|p| {
                        RegexBuilder::new(p)
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| Error::InvalidPattern(format!("{}: {}", p, e)))
                    })
                    .collect::<Result<_>>()?,
            ),
            Condition::All(nested) => CompiledCondition::All(
                nested.iter().map(Self::compile).collect::<Result<_>>()?,
            ),
            Condition::Any(nested) => CompiledCondition::Any(
                nested.iter().map(Self::compile).collect::<Result<_>>()?,
            ),
        })
    }

    fn holds(&self, title: &str) -> bool {
        match self {
            CompiledCondition::AnyPattern(regexes) => regexes.iter().any(|r| r.is_match(title)),
            CompiledCondition::All(nested) => nested.iter().all(|c| c.holds(title)),
            CompiledCondition::Any(nested) => nested.iter().any(|c| c.holds(title)),
        }
    }
}

/// Compiled form of [`CategoryRules`]
#[derive(Debug, Clone)]
pub struct CourseCategorizer {
    rules: Vec<(CourseCategory, CompiledCondition)>,
}

impl Default for CourseCategorizer {
    fn default() -> Self {
        // built-in patterns are known to compile
        Self::new(&CategoryRules::default()).unwrap_or(Self { rules: Vec::new() })
    }
}

impl CourseCategorizer {
    pub fn new(rules: &CategoryRules) -> Result<Self> {
        let rules = rules
            .rules
            .iter()
            .map(|rule| Ok((rule.category, CompiledCondition::compile(&rule.when)?)))
            .collect::<Result<_>>()?;
        Ok(Self { rules })
    }

    pub fn categorize(&self, title: &str) -> CourseCategory {
        self.rules
            .iter()
            .find(|(_, condition)| condition.holds(title))
            .map(|(category, _)| *category)
            .unwrap_or(CourseCategory::Other)
    }

    /// Bucket titles by category, each bucket sorted and deduplicated.
    /// Every category is present, possibly empty.
    pub fn group<'a, I>(&self, titles: I) -> BTreeMap<CourseCategory, Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut groups: BTreeMap<CourseCategory, Vec<String>> = CourseCategory::ALL
            .iter()
            .map(|c| (*c, Vec::new()))
            .collect();

        for title in titles {
            groups
                .entry(self.categorize(title))
                .or_default()
                .push(title.to_string());
        }

        for bucket in groups.values_mut() {
            bucket.sort();
            bucket.dedup();
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorize(title: &str) -> CourseCategory {
        CourseCategorizer::default().categorize(title)
    }

    #[test]
    fn test_reference_titles() {
        assert_eq!(
            categorize("Integrated M.Tech in Computer Science"),
            CourseCategory::Integrated
        );
        assert_eq!(
            categorize("Bachelor of Technology in Civil Engineering"),
            CourseCategory::BachelorEngineering
        );
        assert_eq!(categorize("PG Diploma in Data Analytics"), CourseCategory::Diploma);
        assert_eq!(categorize("Bachelor of Arts in History"), CourseCategory::Other);
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(categorize("B.Tech + M.Tech Dual Degree"), CourseCategory::Integrated);
        assert_eq!(categorize("M.E. Structural Engineering"), CourseCategory::MasterEngineering);
        assert_eq!(categorize("B.Sc Physics"), CourseCategory::BachelorScience);
        assert_eq!(categorize("Master of Science in Chemistry"), CourseCategory::MasterScience);
        assert_eq!(categorize("MCA"), CourseCategory::ComputerApplications);
        assert_eq!(categorize("Ph.D in Mathematics"), CourseCategory::Doctoral);
        assert_eq!(categorize("Polytechnic Mechanical"), CourseCategory::Diploma);
    }

    #[test]
    fn test_integrated_needs_engineering_degree() {
        // the qualifier alone does not make a title integrated
        assert_eq!(categorize("Integrated M.Sc Physics"), CourseCategory::MasterScience);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(categorize("B.TECH COMPUTER SCIENCE"), CourseCategory::BachelorEngineering);
    }

    #[test]
    fn test_group_sorts_and_keeps_every_bucket() {
        let groups = CourseCategorizer::default().group([
            "B.Tech Mechanical",
            "B.Sc Zoology",
            "B.Tech Civil",
            "B.Tech Civil",
        ]);
        assert_eq!(groups.len(), CourseCategory::ALL.len());
        assert_eq!(
            groups[&CourseCategory::BachelorEngineering],
            vec!["B.Tech Civil", "B.Tech Mechanical"]
        );
        assert!(groups[&CourseCategory::Doctoral].is_empty());
    }

    #[test]
    fn test_rules_round_trip_through_json() {
        let rules = CategoryRules::default();
        let json = serde_json::to_string(&rules).unwrap();
        let parsed: CategoryRules = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rules);
    }

    #[test]
    fn test_custom_rules() {
        let rules: CategoryRules = serde_json::from_str(
            r#"{"rules": [{"category": "doctoral", "when": {"any_pattern": ["\\bdphil\\b"]}}]}"#,
        )
        .unwrap();
        let categorizer = CourseCategorizer::new(&rules).unwrap();
        assert_eq!(categorizer.categorize("DPhil Economics"), CourseCategory::Doctoral);
        assert_eq!(categorizer.categorize("B.Tech Civil"), CourseCategory::Other);
    }

    #[test]
    fn test_invalid_pattern() {
        let rules = CategoryRules {
            rules: vec![CategoryRule {
                category: CourseCategory::Diploma,
                when: Condition::AnyPattern(vec!["(".to_string()]),
            }],
        };
        assert!(matches!(
            CourseCategorizer::new(&rules),
            Err(Error::InvalidPattern(_))
        ));
    }
}
