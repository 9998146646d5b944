use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{PhotoStore, RecordStore};

/// Shared by every handler. Holds configuration only: each request opens
/// the store, works on its own copy of the table and saves it back.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config: Arc::new(config),
        }
    }

    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(&self.config.students_csv)
    }

    pub fn photo_store(&self) -> PhotoStore {
        PhotoStore::new(&self.config.upload_dir)
    }
}
