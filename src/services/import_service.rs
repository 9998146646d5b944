use clap::ValueEnum;
use serde::Deserialize;

use crate::database::{csv_codec, RecordStore};
use crate::error::StoreResult;
use crate::models::{StudentTable, DEFAULT_DEDUP_KEY};
use crate::services::student_table_service;

pub const TEMPLATE_FILE_NAME: &str = "students_template.csv";
pub const EXPORT_FILE_NAME: &str = "students.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Add rows, skipping contacts already present.
    #[default]
    Append,
    /// Throw away the current table.
    Replace,
}

impl ImportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportMode::Append => "append",
            ImportMode::Replace => "replace",
        }
    }

    pub fn parse(raw: &str) -> Option<ImportMode> {
        match raw.trim().to_lowercase().as_str() {
            "append" => Some(ImportMode::Append),
            "replace" => Some(ImportMode::Replace),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ImportReport {
    pub mode: ImportMode,
    pub incoming_rows: usize,
    pub total_rows: usize,
    pub table: StudentTable,
}

/// Apply an uploaded CSV to the store and save the result.
pub fn import_csv(
    store: &RecordStore,
    bytes: &[u8],
    upload_name: &str,
    mode: ImportMode,
) -> StoreResult<ImportReport> {
    let raw = csv_codec::parse_raw_table(bytes, upload_name)?;
    let incoming = student_table_service::normalize_schema(&raw);
    let incoming_rows = incoming.len();

    let current = store.load()?;
    let table = match mode {
        ImportMode::Append => {
            student_table_service::merge_append(current, incoming, DEFAULT_DEDUP_KEY)
        }
        ImportMode::Replace => student_table_service::replace_all(current, incoming),
    };
    store.save(&table)?;

    tracing::info!(
        "imported {} ({} mode): {} rows read, {} rows total",
        upload_name,
        mode.as_str(),
        incoming_rows,
        table.len()
    );
    Ok(ImportReport {
        mode,
        incoming_rows,
        total_rows: table.len(),
        table,
    })
}

/// Header-only CSV for people preparing an import by hand.
pub fn template_csv() -> StoreResult<Vec<u8>> {
    csv_codec::encode_table(&StudentTable::new(), TEMPLATE_FILE_NAME)
}

pub fn export_csv(store: &RecordStore) -> StoreResult<Vec<u8>> {
    let table = store.load()?;
    csv_codec::encode_table(&table, EXPORT_FILE_NAME)
}
