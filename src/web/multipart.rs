use axum::extract::multipart::{Multipart, MultipartError};
use std::collections::HashMap;

use crate::services::registration_service::PhotoUpload;

pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn into_photo(self) -> PhotoUpload {
        PhotoUpload {
            file_name: self.file_name,
            bytes: self.bytes,
        }
    }
}

/// A fully read multipart body: text fields (first value wins) and files.
#[derive(Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn is_checked(&self, name: &str) -> bool {
        matches!(self.text(name), "on" | "true" | "1")
    }

    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (matching, rest): (Vec<UploadedFile>, Vec<UploadedFile>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field == field);
        self.files = rest;
        matching
    }
}

/// Read every part. File inputs left empty by the browser arrive with an
/// empty file name and no bytes; those are skipped.
pub async fn read_multipart(multipart: &mut Multipart) -> Result<MultipartForm, MultipartError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;

        match file_name {
            Some(file_name) => {
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.push(UploadedFile {
                    field: name,
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                form.fields
                    .entry(name)
                    .or_insert_with(|| String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    Ok(form)
}
