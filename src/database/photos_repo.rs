use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult, ValidationError};

pub const ALLOWED_PHOTO_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    /// Attached to a registration form submission.
    Student,
    /// Uploaded on the gallery page, not tied to a record.
    Gallery,
}

impl PhotoKind {
    fn dir_name(self) -> &'static str {
        match self {
            PhotoKind::Student => "students",
            PhotoKind::Gallery => "gallery",
        }
    }
}

/// Uploaded photo files. Files are never removed from here.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PhotoStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, kind: PhotoKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn ensure_dirs(&self) -> StoreResult<()> {
        for kind in [PhotoKind::Student, PhotoKind::Gallery] {
            let dir = self.dir(kind);
            fs::create_dir_all(&dir).map_err(|e| StoreError::io(dir.display().to_string(), e))?;
        }
        Ok(())
    }

    /// Write an upload under a random name, keeping the (lower-cased)
    /// extension. Returns the stored path.
    pub fn save(&self, kind: PhotoKind, original_name: &str, bytes: &[u8]) -> StoreResult<PathBuf> {
        let ext = photo_extension(original_name).unwrap_or_default();
        let dir = self.dir(kind);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(dir.display().to_string(), e))?;

        let file_name = if ext.is_empty() {
            Uuid::new_v4().simple().to_string()
        } else {
            format!("{}.{}", Uuid::new_v4().simple(), ext)
        };
        let path = dir.join(file_name);
        fs::write(&path, bytes).map_err(|e| StoreError::io(path.display().to_string(), e))?;

        tracing::info!("stored {} photo {} ({} bytes)", kind.dir_name(), path.display(), bytes.len());
        Ok(path)
    }

    /// Gallery uploads, sorted by file name.
    pub fn list_gallery(&self) -> StoreResult<Vec<PathBuf>> {
        let dir = self.dir(PhotoKind::Gallery);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(StoreError::io(dir.display().to_string(), e)),
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect();
        paths.sort();
        Ok(paths)
    }
}

/// Lower-cased extension of an uploaded file name, if it has one.
pub fn photo_extension(original_name: &str) -> Option<String> {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

pub fn check_photo_name(original_name: &str) -> Result<(), ValidationError> {
    match photo_extension(original_name) {
        Some(ext) if ALLOWED_PHOTO_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ValidationError::UnsupportedPhotoType(ext)),
        None => Err(ValidationError::UnsupportedPhotoType(original_name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn saved_photos_get_unique_lowercase_names() {
        let dir = tempdir().unwrap();
        let photos = PhotoStore::new(dir.path());

        let a = photos.save(PhotoKind::Student, "Me.JPG", b"one").unwrap();
        let b = photos.save(PhotoKind::Student, "Me.JPG", b"two").unwrap();

        assert_ne!(a, b);
        assert_eq!(a.extension().unwrap(), "jpg");
        assert_eq!(a.parent().unwrap(), dir.path().join("students"));
        assert_eq!(fs::read(&b).unwrap(), b"two");
    }

    #[test]
    fn gallery_listing_only_sees_gallery_files() {
        let dir = tempdir().unwrap();
        let photos = PhotoStore::new(dir.path());
        assert!(photos.list_gallery().unwrap().is_empty());

        photos.save(PhotoKind::Student, "a.png", b"x").unwrap();
        let g = photos.save(PhotoKind::Gallery, "b.png", b"y").unwrap();
        assert_eq!(photos.list_gallery().unwrap(), vec![g]);
    }

    #[test]
    fn only_image_extensions_pass() {
        assert!(check_photo_name("x.PNG").is_ok());
        assert!(check_photo_name("x.jpeg").is_ok());
        assert_eq!(
            check_photo_name("x.gif"),
            Err(ValidationError::UnsupportedPhotoType("gif".into()))
        );
        assert!(check_photo_name("noext").is_err());
    }
}
