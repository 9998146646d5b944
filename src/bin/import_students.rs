use clap::Parser;
use dotenvy::dotenv;
use std::fs;
use std::path::PathBuf;

use registration::config::AppConfig;
use registration::services::import_service::{self, ImportMode};
use registration::web::AppState;

/// Load a CSV file into the students store, the same way the import page does
#[derive(Parser, Debug)]
#[command(name = "import_students")]
struct Args {
    /// CSV file to import (UTF-8 or Windows-1256)
    csv_path: PathBuf,

    /// Keep existing rows (append) or discard them (replace)
    #[arg(value_enum, default_value_t = ImportMode::Append)]
    mode: ImportMode,
}

fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let source_name = args.csv_path.display().to_string();

    let bytes = match fs::read(&args.csv_path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("cannot read {}: {}", source_name, e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(AppConfig::from_env());
    match import_service::import_csv(&state.record_store(), &bytes, &source_name, args.mode) {
        Ok(report) => {
            println!(
                "import ({}): read={}, total={}",
                report.mode.as_str(),
                report.incoming_rows,
                report.total_rows
            );
        }
        Err(e) => {
            eprintln!("import failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_append() {
        let args = Args::try_parse_from(["import_students", "new.csv"]).unwrap();
        assert_eq!(args.csv_path, PathBuf::from("new.csv"));
        assert_eq!(args.mode, ImportMode::Append);
    }

    #[test]
    fn replace_is_accepted_and_unknown_modes_are_not() {
        let args = Args::try_parse_from(["import_students", "new.csv", "replace"]).unwrap();
        assert_eq!(args.mode, ImportMode::Replace);
        assert!(Args::try_parse_from(["import_students", "new.csv", "merge"]).is_err());
        assert!(Args::try_parse_from(["import_students"]).is_err());
    }
}
