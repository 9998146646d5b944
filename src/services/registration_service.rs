use crate::database::photos_repo::check_photo_name;
use crate::database::{PhotoKind, PhotoStore, RecordStore};
use crate::error::{DuplicateKeyError, InsertOutcome, StoreResult, ValidationError};
use crate::models::student::{MAX_AGE, MIN_AGE};
use crate::models::{NewStudent, StudentTable, DEFAULT_DEDUP_KEY};
use crate::services::student_table_service;

pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct RegistrationResult {
    pub outcome: InsertOutcome,
    /// The table after the interaction (unchanged unless inserted).
    pub table: StudentTable,
}

/// One form submission: check the input, store the photo, insert, save.
/// The photo is only written once the record is known to be accepted.
pub fn register_student(
    store: &RecordStore,
    photos: &PhotoStore,
    mut candidate: NewStudent,
    photo: Option<PhotoUpload>,
) -> StoreResult<RegistrationResult> {
    let table = store.load()?;

    if let Err(e) = check_form_fields(&candidate, photo.as_ref()) {
        return Ok(RegistrationResult {
            outcome: InsertOutcome::Invalid(e),
            table,
        });
    }

    if table.contains_key(DEFAULT_DEDUP_KEY, &candidate.contact) {
        tracing::info!("registration refused, {} already registered", candidate.contact);
        return Ok(RegistrationResult {
            outcome: InsertOutcome::Duplicate(DuplicateKeyError {
                column: DEFAULT_DEDUP_KEY,
                value: candidate.contact,
            }),
            table,
        });
    }

    if let Some(photo) = photo {
        let path = photos.save(PhotoKind::Student, &photo.file_name, &photo.bytes)?;
        candidate.photo_path = path.display().to_string();
    }

    let (table, outcome) = student_table_service::insert_one(table, candidate, DEFAULT_DEDUP_KEY);
    if outcome.is_inserted() {
        store.save(&table)?;
    }
    Ok(RegistrationResult { outcome, table })
}

fn check_form_fields(
    candidate: &NewStudent,
    photo: Option<&PhotoUpload>,
) -> Result<(), ValidationError> {
    student_table_service::validate_candidate(candidate)?;
    if !(MIN_AGE..=MAX_AGE).contains(&candidate.age) {
        return Err(ValidationError::AgeOutOfRange {
            value: candidate.age,
            min: MIN_AGE,
            max: MAX_AGE,
        });
    }
    if let Some(photo) = photo {
        check_photo_name(&photo.file_name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn candidate(contact: &str) -> NewStudent {
        NewStudent {
            first_name: "Ali".into(),
            last_name: "Rezaei".into(),
            contact: contact.into(),
            accepted_terms: true,
            ..NewStudent::default()
        }
    }

    #[test]
    fn accepted_registration_is_persisted_with_photo() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("students.csv"));
        let photos = PhotoStore::new(dir.path().join("uploads"));

        let upload = PhotoUpload {
            file_name: "face.PNG".into(),
            bytes: vec![1, 2, 3],
        };
        let result = register_student(&store, &photos, candidate("a@x.com"), Some(upload)).unwrap();
        assert!(result.outcome.is_inserted());

        let saved = store.load().unwrap();
        assert_eq!(saved, result.table);
        let photo_path = &saved.rows()[0].photo_path;
        assert!(photo_path.ends_with(".png"));
        assert!(std::path::Path::new(photo_path).exists());
    }

    #[test]
    fn duplicate_does_not_store_photo_or_rewrite_file() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("students.csv"));
        let photos = PhotoStore::new(dir.path().join("uploads"));
        register_student(&store, &photos, candidate("a@x.com"), None).unwrap();

        let upload = PhotoUpload {
            file_name: "face.jpg".into(),
            bytes: vec![9],
        };
        let result = register_student(&store, &photos, candidate("a@x.com"), Some(upload)).unwrap();
        assert!(matches!(result.outcome, InsertOutcome::Duplicate(_)));
        assert_eq!(store.load().unwrap().len(), 1);
        assert!(!photos.dir(PhotoKind::Student).exists());
    }

    #[test]
    fn out_of_range_age_and_bad_photo_type_are_rejected() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("students.csv"));
        let photos = PhotoStore::new(dir.path().join("uploads"));

        let too_old = NewStudent { age: 21, ..candidate("a@x.com") };
        let result = register_student(&store, &photos, too_old, None).unwrap();
        assert_eq!(
            result.outcome,
            InsertOutcome::Invalid(ValidationError::AgeOutOfRange { value: 21, min: 6, max: 20 })
        );

        let gif = PhotoUpload {
            file_name: "anim.gif".into(),
            bytes: vec![],
        };
        let result = register_student(&store, &photos, candidate("a@x.com"), Some(gif)).unwrap();
        assert_eq!(
            result.outcome,
            InsertOutcome::Invalid(ValidationError::UnsupportedPhotoType("gif".into()))
        );
        assert!(!store.path().exists());
    }
}
