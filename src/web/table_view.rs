use serde::Deserialize;

use crate::config::clamp_table_height;
use crate::models::{Column, StudentRecord, StudentTable, REQUIRED_COLUMNS};
use crate::services::student_table_service;

/// Search and sort controls shared by every page showing the table.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct TableQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>, // asc|desc
    /// Kept as text: a cleared height box submits `height=`.
    pub height: Option<String>,
}

impl TableQuery {
    pub fn sort_column(&self) -> Column {
        self.sort
            .as_deref()
            .and_then(Column::parse)
            .unwrap_or(Column::SubmittedAt)
    }

    pub fn ascending(&self) -> bool {
        self.order.as_deref() != Some("desc")
    }

    pub fn search(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }

    pub fn height(&self, default_height: u32) -> u32 {
        let height = self
            .height
            .as_deref()
            .and_then(|h| h.trim().parse().ok())
            .unwrap_or(default_height);
        clamp_table_height(height)
    }
}

pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub struct TableView {
    /// Where the search form submits to.
    pub action: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub query: String,
    pub sort_options: Vec<SortOption>,
    pub descending: bool,
    pub height: u32,
    pub total_rows: usize,
}

impl TableView {
    pub fn build(table: &StudentTable, query: &TableQuery, default_height: u32, action: &str) -> Self {
        let sort = query.sort_column();
        let view = student_table_service::filtered_sorted_view(
            table,
            query.search(),
            sort,
            query.ascending(),
        );

        TableView {
            action: action.to_string(),
            headers: REQUIRED_COLUMNS.iter().map(|c| c.label()).collect(),
            rows: view.rows().iter().map(row_cells).collect(),
            query: query.search().to_string(),
            sort_options: REQUIRED_COLUMNS
                .iter()
                .map(|c| SortOption {
                    value: c.as_str(),
                    label: c.label(),
                    selected: *c == sort,
                })
                .collect(),
            descending: !query.ascending(),
            height: query.height(default_height),
            total_rows: table.len(),
        }
    }

    /// A one-off table of freshly added records, without search controls.
    pub fn plain(records: &[StudentRecord], height: u32, action: &str) -> Self {
        let table = StudentTable::from_rows(records.to_vec());
        TableView::build(&table, &TableQuery::default(), height, action)
    }

    pub fn shown_rows(&self) -> usize {
        self.rows.len()
    }
}

fn row_cells(record: &StudentRecord) -> Vec<String> {
    REQUIRED_COLUMNS.iter().map(|c| record.cell(*c)).collect()
}
