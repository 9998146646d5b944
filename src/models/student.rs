use serde::{Serialize, Serializer};
use std::cmp::Ordering;

use super::column::Column;

pub const MIN_AGE: i64 = 6;
pub const MAX_AGE: i64 = 20;
pub const DEFAULT_FORM_AGE: i64 = 12;

/// Layout used for `submitted_at`.
pub const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GradeLevel {
    Seventh,
    Eighth,
    Ninth,
    Tenth,
    Eleventh,
    Twelfth,
}

pub const GRADE_LEVELS: [GradeLevel; 6] = [
    GradeLevel::Seventh,
    GradeLevel::Eighth,
    GradeLevel::Ninth,
    GradeLevel::Tenth,
    GradeLevel::Eleventh,
    GradeLevel::Twelfth,
];

impl GradeLevel {
    pub fn label(self) -> &'static str {
        match self {
            GradeLevel::Seventh => "هفتم",
            GradeLevel::Eighth => "هشتم",
            GradeLevel::Ninth => "نهم",
            GradeLevel::Tenth => "دهم",
            GradeLevel::Eleventh => "یازدهم",
            GradeLevel::Twelfth => "دوازدهم",
        }
    }

    fn number(self) -> u8 {
        match self {
            GradeLevel::Seventh => 7,
            GradeLevel::Eighth => 8,
            GradeLevel::Ninth => 9,
            GradeLevel::Tenth => 10,
            GradeLevel::Eleventh => 11,
            GradeLevel::Twelfth => 12,
        }
    }

    fn english(self) -> &'static str {
        match self {
            GradeLevel::Seventh => "seventh",
            GradeLevel::Eighth => "eighth",
            GradeLevel::Ninth => "ninth",
            GradeLevel::Tenth => "tenth",
            GradeLevel::Eleventh => "eleventh",
            GradeLevel::Twelfth => "twelfth",
        }
    }

    /// Accepts the label, the English ordinal word, `7` and `7th` forms.
    pub fn parse(raw: &str) -> Option<GradeLevel> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return None;
        }
        GRADE_LEVELS.iter().copied().find(|g| {
            let n = g.number().to_string();
            value == g.label() || value == g.english() || value == n || value == format!("{}th", n)
        })
    }
}

impl Serialize for GradeLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Female,
    Male,
    Other,
}

pub const GENDERS: [Gender; 3] = [Gender::Female, Gender::Male, Gender::Other];

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "دختر",
            Gender::Male => "پسر",
            Gender::Other => "دیگر",
        }
    }

    pub fn parse(raw: &str) -> Option<Gender> {
        match raw.trim().to_lowercase().as_str() {
            "دختر" | "female" | "girl" | "f" => Some(Gender::Female),
            "پسر" | "male" | "boy" | "m" => Some(Gender::Male),
            "دیگر" | "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One registrant, after schema normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub grade_level: Option<GradeLevel>,
    pub contact: String,
    pub gender: Option<Gender>,
    pub feedback: String,
    pub submitted_at: String,
    pub photo_path: String,
    pub accepted_terms: bool,
}

impl Default for StudentRecord {
    fn default() -> Self {
        StudentRecord {
            first_name: String::new(),
            last_name: String::new(),
            age: 0,
            grade_level: None,
            contact: String::new(),
            gender: None,
            feedback: String::new(),
            submitted_at: String::new(),
            photo_path: String::new(),
            accepted_terms: false,
        }
    }
}

impl StudentRecord {
    /// Text of one cell, as written to CSV and matched by table search.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::FirstName => self.first_name.clone(),
            Column::LastName => self.last_name.clone(),
            Column::Age => self.age.to_string(),
            Column::GradeLevel => self.grade_level.map(|g| g.label()).unwrap_or("").to_string(),
            Column::Contact => self.contact.clone(),
            Column::Gender => self.gender.map(|g| g.label()).unwrap_or("").to_string(),
            Column::Feedback => self.feedback.clone(),
            Column::SubmittedAt => self.submitted_at.clone(),
            Column::PhotoPath => self.photo_path.clone(),
            Column::AcceptedTerms => bool_cell(self.accepted_terms).to_string(),
        }
    }

    pub fn compare_by(&self, other: &StudentRecord, column: Column) -> Ordering {
        match column {
            Column::Age => self.age.cmp(&other.age),
            Column::AcceptedTerms => self.accepted_terms.cmp(&other.accepted_terms),
            Column::GradeLevel => self.grade_level.cmp(&other.grade_level),
            _ => self.cell(column).cmp(&other.cell(column)),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

pub fn bool_cell(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Candidate record coming from the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub grade_level: Option<GradeLevel>,
    pub contact: String,
    pub gender: Option<Gender>,
    pub feedback: String,
    pub photo_path: String,
    pub accepted_terms: bool,
}

impl Default for NewStudent {
    fn default() -> Self {
        NewStudent {
            first_name: String::new(),
            last_name: String::new(),
            age: DEFAULT_FORM_AGE,
            grade_level: Some(GradeLevel::Seventh),
            contact: String::new(),
            gender: Some(Gender::Female),
            feedback: String::new(),
            photo_path: String::new(),
            accepted_terms: false,
        }
    }
}

impl NewStudent {
    pub fn into_record(self, submitted_at: String) -> StudentRecord {
        StudentRecord {
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            grade_level: self.grade_level,
            contact: self.contact,
            gender: self.gender,
            feedback: self.feedback,
            submitted_at,
            photo_path: self.photo_path,
            accepted_terms: self.accepted_terms,
        }
    }
}

/// The students table. Always holds normalized records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StudentTable {
    rows: Vec<StudentRecord>,
}

impl StudentTable {
    pub fn new() -> Self {
        StudentTable::default()
    }

    pub fn from_rows(rows: Vec<StudentRecord>) -> Self {
        StudentTable { rows }
    }

    pub fn rows(&self) -> &[StudentRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<StudentRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_key(&self, key: Column, value: &str) -> bool {
        self.rows.iter().any(|r| r.cell(key) == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_labels_parse_in_several_spellings() {
        assert_eq!(GradeLevel::parse("نهم"), Some(GradeLevel::Ninth));
        assert_eq!(GradeLevel::parse("Ninth"), Some(GradeLevel::Ninth));
        assert_eq!(GradeLevel::parse("9"), Some(GradeLevel::Ninth));
        assert_eq!(GradeLevel::parse("12th"), Some(GradeLevel::Twelfth));
        assert_eq!(GradeLevel::parse("kindergarten"), None);
        assert_eq!(GradeLevel::parse(""), None);
    }

    #[test]
    fn grades_order_from_seventh_to_twelfth() {
        let mut grades = vec![GradeLevel::Twelfth, GradeLevel::Seventh, GradeLevel::Tenth];
        grades.sort();
        assert_eq!(
            grades,
            vec![GradeLevel::Seventh, GradeLevel::Tenth, GradeLevel::Twelfth]
        );
    }

    #[test]
    fn gender_accepts_label_and_english() {
        assert_eq!(Gender::parse("پسر"), Some(Gender::Male));
        assert_eq!(Gender::parse("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::parse("?"), None);
    }

    #[test]
    fn cells_render_enums_and_flags() {
        let record = StudentRecord {
            age: 14,
            grade_level: Some(GradeLevel::Eighth),
            gender: None,
            accepted_terms: true,
            ..StudentRecord::default()
        };
        assert_eq!(record.cell(Column::Age), "14");
        assert_eq!(record.cell(Column::GradeLevel), "هشتم");
        assert_eq!(record.cell(Column::Gender), "");
        assert_eq!(record.cell(Column::AcceptedTerms), "True");
    }

    #[test]
    fn age_compares_numerically() {
        let young = StudentRecord { age: 9, ..StudentRecord::default() };
        let old = StudentRecord { age: 10, ..StudentRecord::default() };
        assert_eq!(young.compare_by(&old, Column::Age), Ordering::Less);
        assert_eq!(young.cell(Column::Age).cmp(&old.cell(Column::Age)), Ordering::Greater);
    }
}
