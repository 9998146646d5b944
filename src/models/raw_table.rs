use super::column::REQUIRED_COLUMNS;
use super::student::StudentTable;

/// A parsed but untyped table: whatever header and cells the CSV carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable { headers, rows }
    }

    /// Render a normalized table back into cells, in persisted column order.
    pub fn from_table(table: &StudentTable) -> Self {
        let headers = REQUIRED_COLUMNS.iter().map(|c| c.as_str().to_string()).collect();
        let rows = table
            .rows()
            .iter()
            .map(|record| REQUIRED_COLUMNS.iter().map(|c| record.cell(*c)).collect())
            .collect();
        RawTable { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
