use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{DataError, Dataset};

/// Canonical form for event tags, drill types and specialties.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Roster membership and coverage compare student ids in this form.
pub fn normalize_student(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTag {
    label: String,
    key: String,
}

impl EventTag {
    /// `None` means no event restriction.
    pub fn parse(raw: &str) -> Option<Self> {
        let label = raw.trim();
        if label.is_empty() {
            return None;
        }
        Some(Self {
            label: label.to_string(),
            key: normalize_tag(label),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, tag: &str) -> bool {
        normalize_tag(tag) == self.key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub student: String,
    pub coach: String,
    pub date: NaiveDate,
    pub minutes: f64,
    pub drill_type: String,
}

impl SessionRecord {
    pub fn check(&self, row: usize) -> Result<(), DataError> {
        let invalid = |field: &'static str, value: String, reason: &'static str| {
            DataError::InvalidField {
                dataset: Dataset::Sessions,
                row,
                field,
                value,
                reason,
            }
        };

        if self.student.trim().is_empty() {
            return Err(invalid("student", self.student.clone(), "must not be empty"));
        }
        if self.coach.trim().is_empty() {
            return Err(invalid("coach", self.coach.clone(), "must not be empty"));
        }
        if !self.minutes.is_finite() {
            return Err(invalid("minutes", self.minutes.to_string(), "must be a number"));
        }
        if self.minutes < 0.0 {
            return Err(invalid(
                "minutes",
                self.minutes.to_string(),
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    students: BTreeSet<String>,
}

impl Roster {
    /// Blank ids are skipped; ids differing only in case or padding collapse.
    pub fn new<I, S>(students: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            students: students
                .into_iter()
                .map(|student| normalize_student(student.as_ref()))
                .filter(|student| !student.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, student: &str) -> bool {
        self.students.contains(&normalize_student(student))
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoachProfile {
    pub coach: String,
    pub specialties: BTreeSet<String>,
    pub rating: Option<f64>,
}

impl CoachProfile {
    pub fn new<I, S>(coach: impl Into<String>, specialties: I, rating: Option<f64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            coach: coach.into(),
            specialties: specialties
                .into_iter()
                .map(|tag| normalize_tag(tag.as_ref()))
                .filter(|tag| !tag.is_empty())
                .collect(),
            rating,
        }
    }

    pub fn has_specialty(&self, event: &EventTag) -> bool {
        self.specialties.iter().any(|tag| event.matches(tag))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoachDirectory {
    profiles: BTreeMap<String, CoachProfile>,
}

impl CoachDirectory {
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = CoachProfile>,
    ) -> Result<Self, DataError> {
        let mut map = BTreeMap::new();
        for profile in profiles {
            if map.contains_key(&profile.coach) {
                return Err(DataError::DuplicateCoach {
                    coach: profile.coach,
                });
            }
            map.insert(profile.coach.clone(), profile);
        }
        Ok(Self { profiles: map })
    }

    pub fn get(&self, coach: &str) -> Option<&CoachProfile> {
        self.profiles.get(coach)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachAggregate {
    pub coach: String,
    pub sessions: usize,
    /// Normalized student ids.
    pub students_covered: BTreeSet<String>,
    pub total_minutes: f64,
    pub most_recent_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentScores {
    pub recency: f64,
    pub volume: f64,
    pub coverage: f64,
    pub minutes: f64,
    pub specialty: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachNote {
    EntireGroupRecently,
    MajorityRecently,
    EntireGroup,
    HighestVolume,
}

impl fmt::Display for CoachNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CoachNote::EntireGroupRecently => "Worked with entire group recently.",
            CoachNote::MajorityRecently => "Worked with majority of group recently.",
            CoachNote::EntireGroup => "Worked with entire group.",
            CoachNote::HighestVolume => "Highest session volume.",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCoach {
    pub aggregate: CoachAggregate,
    pub scores: ComponentScores,
    pub combined_score: f64,
    pub note: Option<CoachNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRow {
    pub coach: String,
    pub tournament: String,
    pub event: Option<String>,
    pub sessions: usize,
    pub students_covered: usize,
    pub total_minutes: f64,
    pub recency_score: f64,
    pub volume_score: f64,
    pub coverage_score: f64,
    pub minutes_score: f64,
    pub specialty_score: f64,
    pub combined_score: f64,
    pub percent_of_group_covered: f64,
    pub notes: String,
}
