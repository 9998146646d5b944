use askama::Template;
use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::StoreError;
use crate::services::import_service::{self, ImportMode, EXPORT_FILE_NAME, TEMPLATE_FILE_NAME};
use crate::web::multipart::read_multipart;
use crate::web::table_view::{TableQuery, TableView};
use crate::web::{error_page, render_html, store_error_page, AppState, Notice, PageMeta};

pub struct ModeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "import.html")]
pub struct ImportTemplate {
    pub page: PageMeta,
    pub notices: Vec<Notice>,
    pub modes: Vec<ModeOption>,
    pub table: TableView,
}

pub async fn import_page(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Response {
    match state.record_store().load() {
        Ok(table) => {
            let view = TableView::build(&table, &query, state.config.table_height, "/import");
            render_import(vec![], ImportMode::default(), view, StatusCode::OK)
        }
        Err(e) => store_error_page("Loading students", &e),
    }
}

pub async fn upload_csv(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut form = match read_multipart(&mut multipart).await {
        Ok(f) => f,
        Err(e) => {
            warn!("CSV upload failed: {}", e);
            return error_page(StatusCode::BAD_REQUEST, format!("Could not read the upload: {}", e));
        }
    };

    let mode = ImportMode::parse(form.text("mode")).unwrap_or_default();
    let store = state.record_store();
    let height = state.config.table_height;

    let Some(file) = form.take_files("csv_file").into_iter().next() else {
        return match store.load() {
            Ok(table) => render_import(
                vec![Notice::error("Choose a CSV file to upload.")],
                mode,
                TableView::build(&table, &TableQuery::default(), height, "/import"),
                StatusCode::BAD_REQUEST,
            ),
            Err(e) => store_error_page("Loading students", &e),
        };
    };

    match import_service::import_csv(&store, &file.bytes, &file.file_name, mode) {
        Ok(report) => {
            let message = match report.mode {
                ImportMode::Replace => format!(
                    "Replaced the table with {} rows from {}.",
                    report.incoming_rows, file.file_name
                ),
                ImportMode::Append => format!(
                    "Read {} rows from {}; duplicates by contact were skipped. Total rows: {}.",
                    report.incoming_rows, file.file_name, report.total_rows
                ),
            };
            let view = TableView::build(&report.table, &TableQuery::default(), height, "/import");
            render_import(vec![Notice::success(message)], mode, view, StatusCode::OK)
        }
        Err(e @ (StoreError::Corrupt { .. } | StoreError::Decode { .. })) => {
            warn!("Rejected CSV upload {}: {}", file.file_name, e);
            match store.load() {
                Ok(table) => render_import(
                    vec![Notice::error(e.to_string())],
                    mode,
                    TableView::build(&table, &TableQuery::default(), height, "/import"),
                    StatusCode::UNPROCESSABLE_ENTITY,
                ),
                Err(e) => store_error_page("Loading students", &e),
            }
        }
        Err(e) => store_error_page("Importing the CSV", &e),
    }
}

pub async fn download_template() -> Response {
    match import_service::template_csv() {
        Ok(bytes) => csv_download(bytes, TEMPLATE_FILE_NAME),
        Err(e) => store_error_page("Building the template", &e),
    }
}

pub async fn download_export(State(state): State<AppState>) -> Response {
    match import_service::export_csv(&state.record_store()) {
        Ok(bytes) => csv_download(bytes, EXPORT_FILE_NAME),
        Err(e) => store_error_page("Exporting students", &e),
    }
}

fn csv_download(bytes: Vec<u8>, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn render_import(
    notices: Vec<Notice>,
    mode: ImportMode,
    table: TableView,
    status: StatusCode,
) -> Response {
    let template = ImportTemplate {
        page: PageMeta::new("import", "CSV import"),
        notices,
        modes: [
            (ImportMode::Append, "Append (keep existing rows)"),
            (ImportMode::Replace, "Replace (discard existing rows)"),
        ]
        .into_iter()
        .map(|(m, label)| ModeOption {
            value: m.as_str(),
            label,
            selected: m == mode,
        })
        .collect(),
        table,
    };
    let mut response = render_html(&template);
    if response.status() == StatusCode::OK {
        *response.status_mut() = status;
    }
    response
}
