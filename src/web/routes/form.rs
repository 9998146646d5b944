use askama::Template;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Response,
};
use tracing::warn;

use crate::error::InsertOutcome;
use crate::models::student::{DEFAULT_FORM_AGE, GENDERS, GRADE_LEVELS, MAX_AGE, MIN_AGE};
use crate::models::{Gender, GradeLevel, NewStudent, StudentRecord, StudentTable};
use crate::services::registration_service;
use crate::web::multipart::{read_multipart, MultipartForm, UploadedFile};
use crate::web::table_view::{TableQuery, TableView};
use crate::web::{error_page, render_html, store_error_page, AppState, Notice, PageMeta};

pub struct Choice {
    pub value: &'static str,
    pub selected: bool,
}

/// What the user typed, echoed back into the form.
pub struct FormValues {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub contact: String,
    pub feedback: String,
    pub accepted_terms: bool,
    grade_level: Option<GradeLevel>,
    gender: Option<Gender>,
}

impl From<&NewStudent> for FormValues {
    fn from(c: &NewStudent) -> Self {
        FormValues {
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            age: c.age,
            contact: c.contact.clone(),
            feedback: c.feedback.clone(),
            accepted_terms: c.accepted_terms,
            grade_level: c.grade_level,
            gender: c.gender,
        }
    }
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub page: PageMeta,
    pub notices: Vec<Notice>,
    pub values: FormValues,
    pub grades: Vec<Choice>,
    pub genders: Vec<Choice>,
    pub min_age: i64,
    pub max_age: i64,
    pub created: Option<TableView>,
    pub table: TableView,
}

pub async fn form_page(State(state): State<AppState>, Query(query): Query<TableQuery>) -> Response {
    let table = match state.record_store().load() {
        Ok(t) => t,
        Err(e) => return store_error_page("Loading students", &e),
    };

    let values = FormValues::from(&NewStudent::default());
    render_form(&state, &table, &query, values, vec![], None)
}

pub async fn submit_form(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut form = match read_multipart(&mut multipart).await {
        Ok(f) => f,
        Err(e) => {
            warn!("Registration form upload failed: {}", e);
            return error_page(StatusCode::BAD_REQUEST, format!("Could not read the form: {}", e));
        }
    };

    let candidate = candidate_from_form(&form);
    let values = FormValues::from(&candidate);
    let photo = form
        .take_files("photo")
        .into_iter()
        .next()
        .map(UploadedFile::into_photo);

    let result = match registration_service::register_student(
        &state.record_store(),
        &state.photo_store(),
        candidate,
        photo,
    ) {
        Ok(r) => r,
        Err(e) => return store_error_page("Saving the registration", &e),
    };

    let (notice, created, values) = match result.outcome {
        InsertOutcome::Inserted(record) => (
            Notice::success("Registration saved."),
            Some(record),
            FormValues::from(&NewStudent::default()),
        ),
        InsertOutcome::Invalid(e) => (Notice::error(capitalize(&e.to_string())), None, values),
        InsertOutcome::Duplicate(e) => (Notice::warning(capitalize(&e.to_string())), None, values),
    };

    render_form(
        &state,
        &result.table,
        &TableQuery::default(),
        values,
        vec![notice],
        created,
    )
}

fn render_form(
    state: &AppState,
    table: &StudentTable,
    query: &TableQuery,
    values: FormValues,
    notices: Vec<Notice>,
    created: Option<StudentRecord>,
) -> Response {
    let height = state.config.table_height;
    let template = FormTemplate {
        page: PageMeta::new("form", "Student registration"),
        notices,
        grades: GRADE_LEVELS
            .iter()
            .map(|g| Choice {
                value: g.label(),
                selected: values.grade_level == Some(*g),
            })
            .collect(),
        genders: GENDERS
            .iter()
            .map(|g| Choice {
                value: g.label(),
                selected: values.gender == Some(*g),
            })
            .collect(),
        values,
        min_age: MIN_AGE,
        max_age: MAX_AGE,
        created: created.map(|r| TableView::plain(&[r], 200, "/form")),
        table: TableView::build(table, query, height, "/form"),
    };
    render_html(&template)
}

fn candidate_from_form(form: &MultipartForm) -> NewStudent {
    let age_text = form.text("age").trim();
    let age = if age_text.is_empty() {
        DEFAULT_FORM_AGE
    } else {
        age_text.parse().unwrap_or(0)
    };

    NewStudent {
        first_name: form.text("first_name").trim().to_string(),
        last_name: form.text("last_name").trim().to_string(),
        age,
        grade_level: GradeLevel::parse(form.text("grade_level")),
        contact: form.text("contact").trim().to_string(),
        gender: Gender::parse(form.text("gender")),
        feedback: form.text("feedback").to_string(),
        photo_path: String::new(),
        accepted_terms: form.is_checked("accepted_terms"),
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
