//! Where the application keeps its files.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".course-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "courses.sqlite";
/// Log file written next to the database; the terminal belongs to the TUI.
const LOG_FILE_NAME: &str = "course-catalog.log";
/// Environment variable that relocates the whole data directory.
pub const HOME_ENV: &str = "COURSE_CATALOG_HOME";

/// File suggested by the "load file" prompt.
pub const DEFAULT_CSV_PATH: &str = "sample.csv";
/// File suggested by the export prompt.
pub const DEFAULT_EXPORT_PATH: &str = "courses_export.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl AppPaths {
    /// Resolve paths from `COURSE_CATALOG_HOME`, falling back to a dot folder
    /// in the user's home directory.
    pub fn resolve() -> Result<Self> {
        let data_dir = match env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let base_dirs =
                    BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
                base_dirs.home_dir().join(DATA_DIR_NAME)
            }
        };
        Ok(Self::in_dir(data_dir))
    }

    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_path: data_dir.join(LOG_FILE_NAME),
            data_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_inside_data_dir() {
        let paths = AppPaths::in_dir("/tmp/catalog");
        assert_eq!(paths.db_path, PathBuf::from("/tmp/catalog/courses.sqlite"));
        assert_eq!(paths.log_path, PathBuf::from("/tmp/catalog/course-catalog.log"));
    }
}
