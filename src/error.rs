use std::io;
use thiserror::Error;

use crate::models::{Column, StudentRecord};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reading or writing the students file (or an uploaded CSV).
/// `source_name` is the file path or upload name involved.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {source_name}: {error}")]
    Io {
        source_name: String,
        #[source]
        error: io::Error,
    },
    #[error("{source_name} is neither UTF-8 nor Windows-1256 text")]
    Decode { source_name: String },
    #[error("{source_name} is not a valid CSV table (line {line}): {reason}")]
    Corrupt {
        source_name: String,
        line: u64,
        reason: String,
    },
}

impl StoreError {
    pub fn io(source_name: impl Into<String>, error: io::Error) -> Self {
        StoreError::Io {
            source_name: source_name.into(),
            error,
        }
    }
}

/// Rejected user input. Nothing is written when one of these comes back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("first name and last name are required")]
    MissingName,
    #[error("the terms must be accepted to register")]
    TermsNotAccepted,
    #[error("an email address or phone number is required")]
    MissingContact,
    #[error("age must be between {min} and {max}, got {value}")]
    AgeOutOfRange { value: i64, min: i64, max: i64 },
    #[error("unsupported photo type `{0}` (jpg, jpeg or png only)")]
    UnsupportedPhotoType(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a record with {} `{value}` is already registered", column.as_str())]
pub struct DuplicateKeyError {
    pub column: Column,
    pub value: String,
}

/// Result of a single-record insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(StudentRecord),
    Invalid(ValidationError),
    Duplicate(DuplicateKeyError),
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}
