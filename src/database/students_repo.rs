use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::database::csv_codec;
use crate::error::{StoreError, StoreResult};
use crate::models::StudentTable;
use crate::services::student_table_service;

/// The students CSV file. Holds no table of its own: callers load, mutate
/// the returned table and hand it back to `save`.
///
/// There is no locking. Two interactions saving at the same time race and
/// the last write wins.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RecordStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    /// Read the table. A missing file is an empty table.
    pub fn load(&self) -> StoreResult<StudentTable> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StudentTable::new()),
            Err(e) => return Err(StoreError::io(self.source_name(), e)),
        };

        let raw = csv_codec::parse_raw_table(&bytes, &self.source_name())?;
        Ok(student_table_service::normalize_schema(&raw))
    }

    /// Rewrite the whole file. The new content goes to a sibling temp file
    /// first and is renamed over the old one.
    pub fn save(&self, table: &StudentTable) -> StoreResult<()> {
        let source_name = self.source_name();
        let bytes = csv_codec::encode_table(table, &source_name)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(&source_name, e))?;
        }

        let tmp_path = self.tmp_path();
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::io(&source_name, e)
        })?;

        tracing::debug!("saved {} rows to {}", table.len(), source_name);
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "students.csv".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, GradeLevel, StudentRecord};
    use tempfile::tempdir;

    fn persian_record() -> StudentRecord {
        StudentRecord {
            first_name: "علی".into(),
            last_name: "رضایی".into(),
            age: 13,
            grade_level: Some(GradeLevel::Eighth),
            contact: "۰۹۱۲۳۴۵۶۷۸۹".into(),
            gender: Some(Gender::Male),
            feedback: "سلام، خوبم\nخط دوم".into(),
            submitted_at: "۱۴۰۳-۰۷-۰۱ ۱۰:۰۰:۰۰".into(),
            photo_path: "uploads/students/عکس.png".into(),
            accepted_terms: true,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("students.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_non_latin_text() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("data").join("students.csv"));
        let table = StudentTable::from_rows(vec![persian_record()]);

        store.save(&table).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, table);

        let first = fs::read(store.path()).unwrap();
        store.save(&loaded).unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), first);
        assert!(!dir.path().join("data").join("students.csv.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.csv");
        fs::write(&path, "first_name,last_name\na,b,c\n").unwrap();

        let err = RecordStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 2, .. }), "{:?}", err);
    }

    #[test]
    fn legacy_persian_headers_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.csv");
        fs::write(
            &path,
            "\u{feff}نام,نام خانوادگی,سن,کلاس,ایمیل,جنسیت,بازخورد,زمان ثبت,عکس,قبول قوانین\n\
             سارا,احمدی,12,هفتم,s@x.com,دختر,,2024-09-01 08:00:00,,True\n",
        )
        .unwrap();

        let table = RecordStore::new(&path).load().unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.first_name, "سارا");
        assert_eq!(row.age, 12);
        assert_eq!(row.grade_level, Some(GradeLevel::Seventh));
        assert_eq!(row.gender, Some(Gender::Female));
        assert!(row.accepted_terms);
    }
}
