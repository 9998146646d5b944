use std::path::Path;

use crate::database::photos_repo::check_photo_name;
use crate::database::{PhotoKind, PhotoStore};
use crate::error::{StoreResult, ValidationError};
use crate::models::StudentTable;
use crate::services::registration_service::PhotoUpload;

/// URL prefix the photo root is served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCard {
    pub url: String,
    pub caption: String,
}

pub struct GalleryUploadReport {
    pub saved: Vec<PhotoCard>,
    pub rejected: Vec<(String, ValidationError)>,
}

/// Photos attached to registrations. A record only gets a card when its
/// photo file still exists and lives under the photo root.
pub fn student_photo_cards(table: &StudentTable, photos: &PhotoStore) -> Vec<PhotoCard> {
    table
        .rows()
        .iter()
        .filter(|r| !r.photo_path.is_empty())
        .filter(|r| Path::new(&r.photo_path).is_file())
        .filter_map(|r| {
            let url = photo_url(photos, Path::new(&r.photo_path))?;
            Some(PhotoCard {
                url,
                caption: r.full_name(),
            })
        })
        .collect()
}

pub fn gallery_cards(photos: &PhotoStore) -> StoreResult<Vec<PhotoCard>> {
    Ok(photos
        .list_gallery()?
        .iter()
        .filter_map(|p| photo_card(photos, p))
        .collect())
}

/// Store every acceptable file. Wrong file types are reported back, not fatal.
pub fn upload_gallery_photos(
    photos: &PhotoStore,
    uploads: Vec<PhotoUpload>,
) -> StoreResult<GalleryUploadReport> {
    let mut report = GalleryUploadReport {
        saved: vec![],
        rejected: vec![],
    };

    for upload in uploads {
        if let Err(e) = check_photo_name(&upload.file_name) {
            tracing::warn!("gallery upload {} rejected: {}", upload.file_name, e);
            report.rejected.push((upload.file_name, e));
            continue;
        }
        let path = photos.save(PhotoKind::Gallery, &upload.file_name, &upload.bytes)?;
        if let Some(card) = photo_card(photos, &path) {
            report.saved.push(card);
        }
    }
    Ok(report)
}

fn photo_card(photos: &PhotoStore, path: &Path) -> Option<PhotoCard> {
    Some(PhotoCard {
        url: photo_url(photos, path)?,
        caption: path.file_name()?.to_string_lossy().into_owned(),
    })
}

/// Map a stored photo path to its URL under `/uploads`.
pub fn photo_url(photos: &PhotoStore, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(photos.root()).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!("{}/{}", UPLOADS_URL_PREFIX, parts.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentRecord;
    use tempfile::tempdir;

    #[test]
    fn only_existing_photos_get_cards() {
        let dir = tempdir().unwrap();
        let photos = PhotoStore::new(dir.path());
        let kept = photos.save(PhotoKind::Student, "a.jpg", b"x").unwrap();

        let table = StudentTable::from_rows(vec![
            StudentRecord {
                first_name: "Sara".into(),
                last_name: "Ahmadi".into(),
                photo_path: kept.display().to_string(),
                ..StudentRecord::default()
            },
            StudentRecord {
                first_name: "Gone".into(),
                photo_path: dir.path().join("students/missing.png").display().to_string(),
                ..StudentRecord::default()
            },
            StudentRecord {
                first_name: "NoPhoto".into(),
                ..StudentRecord::default()
            },
        ]);

        let cards = student_photo_cards(&table, &photos);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].caption, "Sara Ahmadi");
        assert!(cards[0].url.starts_with("/uploads/students/"));
        assert!(cards[0].url.ends_with(".jpg"));
    }

    #[test]
    fn gallery_upload_keeps_good_files_and_reports_bad_ones() {
        let dir = tempdir().unwrap();
        let photos = PhotoStore::new(dir.path());

        let report = upload_gallery_photos(
            &photos,
            vec![
                PhotoUpload { file_name: "one.png".into(), bytes: vec![1] },
                PhotoUpload { file_name: "notes.txt".into(), bytes: vec![2] },
                PhotoUpload { file_name: "two.JPEG".into(), bytes: vec![3] },
            ],
        )
        .unwrap();

        assert_eq!(report.saved.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "notes.txt");
        assert_eq!(gallery_cards(&photos).unwrap().len(), 2);
    }

    #[test]
    fn paths_outside_the_root_have_no_url() {
        let photos = PhotoStore::new("uploads");
        assert_eq!(
            photo_url(&photos, Path::new("uploads/gallery/x.png")).as_deref(),
            Some("/uploads/gallery/x.png")
        );
        assert_eq!(photo_url(&photos, Path::new("/tmp/x.png")), None);
    }
}
