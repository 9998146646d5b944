use askama::Template;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, get_service},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::error;

use crate::error::StoreError;

pub mod multipart;
pub mod routes;
pub mod state;
pub mod table_view;

use routes::{form, gallery, import, students_api};
pub use state::AppState;

/// Header and navigation data every page template carries.
pub struct PageMeta {
    pub nav: &'static str, // form|import|gallery
    pub title: &'static str,
}

impl PageMeta {
    pub fn new(nav: &'static str, title: &'static str) -> Self {
        PageMeta { nav, title }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: &'static str, // success|warning|error|info
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice { kind: "success", message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice { kind: "warning", message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice { kind: "error", message: message.into() }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub page: PageMeta,
    pub message: String,
}

pub fn render_html<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template render failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn error_page(status: StatusCode, message: impl Into<String>) -> Response {
    let template = ErrorTemplate {
        page: PageMeta::new("", "Error"),
        message: message.into(),
    };
    let mut response = render_html(&template);
    *response.status_mut() = status;
    response
}

/// Store failures are never swallowed: log them and show them.
pub fn store_error_page(context: &str, e: &StoreError) -> Response {
    error!("{} failed: {}", context, e);
    error_page(StatusCode::INTERNAL_SERVER_ERROR, format!("{} failed: {}", context, e))
}

pub fn router(state: AppState) -> Router {
    let upload_dir = state.config.upload_dir.clone();
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(|| async { Redirect::to("/form") }))
        .route("/form", get(form::form_page).post(form::submit_form))
        .route("/import", get(import::import_page).post(import::upload_csv))
        .route("/import/template.csv", get(import::download_template))
        .route("/export.csv", get(import::download_export))
        .route("/gallery", get(gallery::gallery_page).post(gallery::upload_photos))
        .route("/api/students", get(students_api::list_students))
        // Uploaded photos
        .nest_service("/uploads", get_service(ServeDir::new(upload_dir)))
        // Layers
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
