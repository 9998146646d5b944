use std::env;
use std::path::PathBuf;

pub const MIN_TABLE_HEIGHT: u32 = 200;
pub const MAX_TABLE_HEIGHT: u32 = 800;

/// Settings read from the environment (and `.env`, via dotenvy in main).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub students_csv: PathBuf,
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Default height in pixels of the students table.
    pub table_height: u32,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            students_csv: PathBuf::from("students.csv"),
            upload_dir: PathBuf::from("uploads"),
            host: "127.0.0.1".to_string(),
            port: 3000,
            table_height: 380,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            students_csv: env::var("STUDENTS_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.students_csv),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed_var("PORT").unwrap_or(defaults.port),
            table_height: parsed_var("TABLE_HEIGHT")
                .map(clamp_table_height)
                .unwrap_or(defaults.table_height),
            max_upload_bytes: parsed_var("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
        }
    }
}

pub fn clamp_table_height(height: u32) -> u32 {
    height.clamp(MIN_TABLE_HEIGHT, MAX_TABLE_HEIGHT)
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
