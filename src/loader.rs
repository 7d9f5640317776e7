//! Line-oriented course files.
//!
//! Each non-blank line holds `number,title[,prerequisite...]`. There is no
//! quoting; every comma separates a field. Exports use the same layout so an
//! exported file can be loaded back.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::error::CatalogError;
use crate::index::CourseIndex;
use crate::models::Course;

/// Result of parsing a whole file.
#[derive(Debug, Default)]
pub struct ParsedCourses {
    pub courses: Vec<Course>,
    /// 1-based line numbers of rows missing a number or title.
    pub skipped: Vec<usize>,
}

/// Outcome of loading a file into an index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Courses newly added to the index.
    pub loaded: usize,
    /// Rows whose course number was already indexed.
    pub duplicates: usize,
    /// 1-based line numbers of malformed rows.
    pub skipped: Vec<usize>,
}

/// Parse a single row. Rows without both a course number and a title are
/// rejected; trailing empty prerequisite fields are dropped.
pub fn parse_line(line: &str) -> Option<Course> {
    let mut tokens = line.split(',').map(str::trim);
    let number = tokens.next().filter(|token| !token.is_empty())?;
    let title = tokens.next().filter(|token| !token.is_empty())?;
    let prerequisites = tokens
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
    Some(Course::new(number, title, prerequisites))
}

/// Parse every row from `reader`. Blank lines are ignored without being
/// reported.
pub fn read_courses<R: BufRead>(reader: R) -> io::Result<ParsedCourses> {
    let mut parsed = ParsedCourses::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Some(course) => parsed.courses.push(course),
            None => {
                warn!(line = idx + 1, "skipping row without course number and title");
                parsed.skipped.push(idx + 1);
            }
        }
    }
    Ok(parsed)
}

/// Read `path` and insert every valid row into `index`.
///
/// The whole file is parsed before the index is touched, so an unreadable file
/// leaves the index exactly as it was.
pub fn load_courses_from_file(
    path: &Path,
    index: &mut CourseIndex,
) -> Result<LoadReport, CatalogError> {
    let parsed = read_courses_from_file(path)?;

    let mut report = LoadReport {
        skipped: parsed.skipped,
        ..LoadReport::default()
    };
    for course in parsed.courses {
        if index.insert(course) {
            report.loaded += 1;
        } else {
            report.duplicates += 1;
        }
    }

    info!(
        path = %path.display(),
        loaded = report.loaded,
        duplicates = report.duplicates,
        skipped = report.skipped.len(),
        "loaded courses from file"
    );
    Ok(report)
}

/// Open and parse `path` without touching any index.
pub fn read_courses_from_file(path: &Path) -> Result<ParsedCourses, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_courses(BufReader::new(file)).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write one row per course in iteration order. Returns the number of rows.
pub fn write_courses<'a, W, I>(mut writer: W, courses: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Course>,
{
    let mut written = 0;
    for course in courses {
        write!(writer, "{},{}", course.number, course.title)?;
        for prerequisite in &course.prerequisites {
            write!(writer, ",{prerequisite}")?;
        }
        writeln!(writer)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Export the index to `path` in ascending course-number order.
pub fn export_courses_to_file(path: &Path, index: &CourseIndex) -> Result<usize, CatalogError> {
    let file = File::create(path).map_err(|source| CatalogError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let written =
        write_courses(BufWriter::new(file), index).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), written, "exported courses");
    Ok(written)
}
