use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::services::student_table_service;
use crate::web::table_view::TableQuery;
use crate::web::AppState;

/// The same filtered, sorted view the pages show, as JSON.
pub async fn list_students(State(state): State<AppState>, Query(query): Query<TableQuery>) -> Response {
    let table = match state.record_store().load() {
        Ok(t) => t,
        Err(e) => {
            error!("Student listing failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let view = student_table_service::filtered_sorted_view(
        &table,
        query.search(),
        query.sort_column(),
        query.ascending(),
    );
    (StatusCode::OK, Json(view)).into_response()
}
