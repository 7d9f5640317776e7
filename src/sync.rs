//! Glue that moves courses between the SQLite store and the in-memory index.
//! The index never talks to the store itself; everything goes through here.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{fetch_courses, insert_course};
use crate::index::CourseIndex;
use crate::loader::read_courses_from_file;

/// Most valid rows a single file import will consider. Malformed and blank
/// lines are reported separately and do not count toward the limit.
pub const MAX_IMPORT_ROWS: usize = 1000;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub inserted: usize,
    /// Course numbers already present in the store, in ascending order.
    pub skipped: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    /// Valid rows whose course number was already stored.
    pub existing: usize,
    /// 1-based line numbers of malformed rows.
    pub malformed: Vec<usize>,
    /// Valid rows ignored because the import limit was reached.
    pub truncated: usize,
}

/// Write every indexed course to the store in ascending order. Courses whose
/// number is already stored are left untouched and reported.
pub fn save_index_to_store(conn: &Connection, index: &CourseIndex) -> Result<SaveReport> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;

    let mut report = SaveReport::default();
    for course in index {
        if insert_course(&tx, course)? {
            report.inserted += 1;
        } else {
            debug!(number = %course.number, "skipped pre-existing course");
            report.skipped.push(course.number.clone());
        }
    }

    tx.commit().context("failed to commit saved courses")?;
    info!(
        inserted = report.inserted,
        skipped = report.skipped.len(),
        "saved index to store"
    );
    Ok(report)
}

/// Insert every stored course into `index`, returning how many were new.
/// The store is read completely first so a failing query leaves `index` as it
/// was.
pub fn load_index_from_store(conn: &Connection, index: &mut CourseIndex) -> Result<usize> {
    let courses = fetch_courses(conn)?;
    let total = courses.len();
    let mut loaded = 0;
    for course in courses {
        if index.insert(course) {
            loaded += 1;
        }
    }
    info!(total, loaded, "loaded courses from store");
    Ok(loaded)
}

/// Build a fresh index holding exactly what the store holds.
pub fn rebuild_index_from_store(conn: &Connection) -> Result<CourseIndex> {
    let index: CourseIndex = fetch_courses(conn)?.into_iter().collect();
    info!(courses = index.len(), "rebuilt index from store");
    Ok(index)
}

/// Import a course file straight into the store, bypassing the index. At most
/// [`MAX_IMPORT_ROWS`] valid rows are considered.
pub fn import_csv_into_store(conn: &Connection, path: &Path) -> Result<ImportReport> {
    let parsed = read_courses_from_file(path)?;

    let mut report = ImportReport {
        malformed: parsed.skipped,
        ..ImportReport::default()
    };
    report.truncated = parsed.courses.len().saturating_sub(MAX_IMPORT_ROWS);

    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;
    for course in parsed.courses.iter().take(MAX_IMPORT_ROWS) {
        if insert_course(&tx, course)? {
            report.inserted += 1;
        } else {
            report.existing += 1;
        }
    }
    tx.commit().context("failed to commit imported courses")?;

    info!(
        path = %path.display(),
        inserted = report.inserted,
        existing = report.existing,
        truncated = report.truncated,
        "imported courses into store"
    );
    Ok(report)
}
