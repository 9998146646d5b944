use serde::Serialize;

/// Columns of the students table, in their persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    FirstName,
    LastName,
    Age,
    GradeLevel,
    Contact,
    Gender,
    Feedback,
    SubmittedAt,
    PhotoPath,
    AcceptedTerms,
}

pub const REQUIRED_COLUMNS: [Column; 10] = [
    Column::FirstName,
    Column::LastName,
    Column::Age,
    Column::GradeLevel,
    Column::Contact,
    Column::Gender,
    Column::Feedback,
    Column::SubmittedAt,
    Column::PhotoPath,
    Column::AcceptedTerms,
];

/// Key used to decide row uniqueness on insert and merge.
pub const DEFAULT_DEDUP_KEY: Column = Column::Contact;

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Column::FirstName => "first_name",
            Column::LastName => "last_name",
            Column::Age => "age",
            Column::GradeLevel => "grade_level",
            Column::Contact => "contact",
            Column::Gender => "gender",
            Column::Feedback => "feedback",
            Column::SubmittedAt => "submitted_at",
            Column::PhotoPath => "photo_path",
            Column::AcceptedTerms => "accepted_terms",
        }
    }

    /// Header written by the earlier Persian-language version of the app.
    pub fn legacy_header(self) -> &'static str {
        match self {
            Column::FirstName => "نام",
            Column::LastName => "نام خانوادگی",
            Column::Age => "سن",
            Column::GradeLevel => "کلاس",
            Column::Contact => "ایمیل",
            Column::Gender => "جنسیت",
            Column::Feedback => "بازخورد",
            Column::SubmittedAt => "زمان ثبت",
            Column::PhotoPath => "عکس",
            Column::AcceptedTerms => "قبول قوانین",
        }
    }

    /// Label shown above the column in the table view.
    pub fn label(self) -> &'static str {
        match self {
            Column::FirstName => "First name",
            Column::LastName => "Last name",
            Column::Age => "Age",
            Column::GradeLevel => "Grade",
            Column::Contact => "Email / phone",
            Column::Gender => "Gender",
            Column::Feedback => "Feedback",
            Column::SubmittedAt => "Submitted at",
            Column::PhotoPath => "Photo",
            Column::AcceptedTerms => "Accepted terms",
        }
    }

    /// Resolve a CSV header cell. Accepts the canonical name and the legacy header.
    pub fn from_header(raw: &str) -> Option<Column> {
        let header = raw.trim_start_matches('\u{feff}').trim();
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .find(|c| c.as_str() == header || c.legacy_header() == header)
    }

    /// Resolve a `sort=` query parameter.
    pub fn parse(raw: &str) -> Option<Column> {
        let name = raw.trim();
        REQUIRED_COLUMNS.iter().copied().find(|c| c.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_resolve_in_both_languages() {
        assert_eq!(Column::from_header("contact"), Some(Column::Contact));
        assert_eq!(Column::from_header(" ایمیل "), Some(Column::Contact));
        assert_eq!(Column::from_header("\u{feff}first_name"), Some(Column::FirstName));
        assert_eq!(Column::from_header("نام خانوادگی"), Some(Column::LastName));
        assert_eq!(Column::from_header("nickname"), None);
    }

    #[test]
    fn sort_parameter_only_takes_canonical_names() {
        assert_eq!(Column::parse("age"), Some(Column::Age));
        assert_eq!(Column::parse("سن"), None);
    }
}
