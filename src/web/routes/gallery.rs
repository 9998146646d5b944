use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use tracing::warn;

use crate::services::gallery_service::{self, PhotoCard};
use crate::web::multipart::{read_multipart, UploadedFile};
use crate::web::{error_page, render_html, store_error_page, AppState, Notice, PageMeta};

#[derive(Template)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub page: PageMeta,
    pub notices: Vec<Notice>,
    pub has_students: bool,
    pub student_photos: Vec<PhotoCard>,
    pub uploaded_now: Vec<PhotoCard>,
    pub gallery_photos: Vec<PhotoCard>,
}

pub async fn gallery_page(State(state): State<AppState>) -> Response {
    render_gallery(&state, vec![], vec![])
}

pub async fn upload_photos(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut form = match read_multipart(&mut multipart).await {
        Ok(f) => f,
        Err(e) => {
            warn!("Gallery upload failed: {}", e);
            return error_page(StatusCode::BAD_REQUEST, format!("Could not read the upload: {}", e));
        }
    };

    let uploads: Vec<_> = form
        .take_files("photos")
        .into_iter()
        .map(UploadedFile::into_photo)
        .collect();
    if uploads.is_empty() {
        return render_gallery(&state, vec![Notice::warning("Choose one or more photos to upload.")], vec![]);
    }

    let report = match gallery_service::upload_gallery_photos(&state.photo_store(), uploads) {
        Ok(r) => r,
        Err(e) => return store_error_page("Storing photos", &e),
    };

    let mut notices = vec![];
    if !report.saved.is_empty() {
        notices.push(Notice::success(format!("{} photos saved.", report.saved.len())));
    }
    for (file_name, e) in &report.rejected {
        notices.push(Notice::error(format!("{}: {}", file_name, e)));
    }
    render_gallery(&state, notices, report.saved)
}

fn render_gallery(state: &AppState, notices: Vec<Notice>, uploaded_now: Vec<PhotoCard>) -> Response {
    let table = match state.record_store().load() {
        Ok(t) => t,
        Err(e) => return store_error_page("Loading students", &e),
    };
    let photos = state.photo_store();
    let gallery_photos = match gallery_service::gallery_cards(&photos) {
        Ok(cards) => cards,
        Err(e) => return store_error_page("Listing the gallery", &e),
    };

    let template = GalleryTemplate {
        page: PageMeta::new("gallery", "Photo gallery"),
        notices,
        has_students: !table.is_empty(),
        student_photos: gallery_service::student_photo_cards(&table, &photos),
        uploaded_now,
        gallery_photos,
    };
    render_html(&template)
}
