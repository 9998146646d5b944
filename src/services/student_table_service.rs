use chrono::Local;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::error::{DuplicateKeyError, InsertOutcome, ValidationError};
use crate::models::student::SUBMITTED_AT_FORMAT;
use crate::models::{
    Column, Gender, GradeLevel, NewStudent, RawTable, StudentRecord, StudentTable,
    REQUIRED_COLUMNS,
};

/// Project any parsed table onto the fixed students schema.
///
/// Unknown columns are dropped and missing ones take their defaults
/// (`0` for age, `false` for accepted_terms, empty text otherwise). When a
/// header repeats, its first occurrence is used. Cells that cannot be read
/// as their column's type fall back to the same defaults. Never fails.
pub fn normalize_schema(raw: &RawTable) -> StudentTable {
    let positions: Vec<Option<usize>> = REQUIRED_COLUMNS
        .iter()
        .map(|col| raw.headers.iter().position(|h| Column::from_header(h) == Some(*col)))
        .collect();

    let mut coerced = 0usize;
    let rows = raw
        .rows
        .iter()
        .map(|cells| normalize_row(cells, &positions, &mut coerced))
        .collect();

    if coerced > 0 {
        warn!("{} cells could not be read as their column type and were reset", coerced);
    }
    StudentTable::from_rows(rows)
}

fn normalize_row(cells: &[String], positions: &[Option<usize>], coerced: &mut usize) -> StudentRecord {
    let cell = |col: Column| {
        positions[col as usize]
            .and_then(|i| cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    };

    let age_raw = cell(Column::Age);
    let age = parse_age(age_raw).unwrap_or_else(|| {
        if !age_raw.trim().is_empty() {
            *coerced += 1;
        }
        0
    });

    let grade_raw = cell(Column::GradeLevel);
    let grade_level = GradeLevel::parse(grade_raw);
    if grade_level.is_none() && !grade_raw.trim().is_empty() {
        *coerced += 1;
    }

    let gender_raw = cell(Column::Gender);
    let gender = Gender::parse(gender_raw);
    if gender.is_none() && !gender_raw.trim().is_empty() {
        *coerced += 1;
    }

    let photo_raw = cell(Column::PhotoPath);
    let photo_path = if photo_raw.trim().is_empty() || photo_raw.trim().eq_ignore_ascii_case("nan") {
        String::new()
    } else {
        photo_raw.to_string()
    };

    StudentRecord {
        first_name: cell(Column::FirstName).to_string(),
        last_name: cell(Column::LastName).to_string(),
        age,
        grade_level,
        contact: cell(Column::Contact).to_string(),
        gender,
        feedback: cell(Column::Feedback).to_string(),
        submitted_at: cell(Column::SubmittedAt).to_string(),
        photo_path,
        accepted_terms: parse_flag(cell(Column::AcceptedTerms)),
    }
}

/// Integer text, or float text with no fractional part (`12.0`).
fn parse_age(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "y")
}

/// Check the form preconditions, in the order the user is told about them.
pub fn validate_candidate(candidate: &NewStudent) -> Result<(), ValidationError> {
    if candidate.first_name.trim().is_empty() || candidate.last_name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if !candidate.accepted_terms {
        return Err(ValidationError::TermsNotAccepted);
    }
    if candidate.contact.trim().is_empty() {
        return Err(ValidationError::MissingContact);
    }
    Ok(())
}

/// Append one registrant, stamped with the current local time.
pub fn insert_one(
    table: StudentTable,
    candidate: NewStudent,
    dedup_key: Column,
) -> (StudentTable, InsertOutcome) {
    let submitted_at = Local::now().format(SUBMITTED_AT_FORMAT).to_string();
    insert_one_at(table, candidate, dedup_key, submitted_at)
}

pub fn insert_one_at(
    table: StudentTable,
    candidate: NewStudent,
    dedup_key: Column,
    submitted_at: String,
) -> (StudentTable, InsertOutcome) {
    if let Err(e) = validate_candidate(&candidate) {
        return (table, InsertOutcome::Invalid(e));
    }

    let record = candidate.into_record(submitted_at);
    let key_value = record.cell(dedup_key);
    if table.contains_key(dedup_key, &key_value) {
        return (
            table,
            InsertOutcome::Duplicate(DuplicateKeyError {
                column: dedup_key,
                value: key_value,
            }),
        );
    }

    let mut rows = table.into_rows();
    rows.push(record.clone());
    info!("registered {} ({})", record.full_name(), key_value);
    (StudentTable::from_rows(rows), InsertOutcome::Inserted(record))
}

/// Concatenate and drop repeated keys, keeping the first row seen. Rows
/// already in `table` therefore win over incoming rows with the same key.
pub fn merge_append(table: StudentTable, incoming: StudentTable, dedup_key: Column) -> StudentTable {
    let before = table.len();
    let incoming_len = incoming.len();

    let mut seen = HashSet::new();
    let rows: Vec<StudentRecord> = table
        .into_rows()
        .into_iter()
        .chain(incoming.into_rows())
        .filter(|r| seen.insert(r.cell(dedup_key)))
        .collect();

    let dropped = before + incoming_len - rows.len();
    info!(
        "merged {} incoming rows into {} ({} duplicates by {} dropped)",
        incoming_len,
        before,
        dropped,
        dedup_key.as_str()
    );
    StudentTable::from_rows(rows)
}

/// Drop `current` entirely in favour of `incoming`. No dedup is applied.
pub fn replace_all(current: StudentTable, incoming: StudentTable) -> StudentTable {
    info!("replacing {} rows with {} imported rows", current.len(), incoming.len());
    incoming
}

/// Rows containing `query` (case-insensitive) in any column, stably
/// sorted by `sort_column`. An empty query keeps every row.
pub fn filtered_sorted_view(
    table: &StudentTable,
    query: &str,
    sort_column: Column,
    ascending: bool,
) -> StudentTable {
    let needle = query.to_lowercase();

    let mut rows: Vec<StudentRecord> = table
        .rows()
        .iter()
        .filter(|r| {
            needle.is_empty()
                || REQUIRED_COLUMNS
                    .iter()
                    .any(|c| r.cell(*c).to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        let ord = a.compare_by(b, sort_column);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    StudentTable::from_rows(rows)
}
