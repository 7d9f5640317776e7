//! Domain models shared by the index, the loader, the SQLite store and the
//! TUI. These stay plain data holders so the other layers can focus on
//! ordering, persistence and presentation.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single catalog entry. The `number` is both the unique identifier and the
/// sort key; it is compared as text, so `CS50` sorts after `CS100`.
pub struct Course {
    /// Course number such as `CSCI200`.
    pub number: String,
    /// Display name.
    pub title: String,
    /// Course numbers that must be taken first, in the order they were given.
    /// Never absent: a course without prerequisites carries an empty list.
    pub prerequisites: Vec<String>,
}

impl Course {
    pub fn new(
        number: impl Into<String>,
        title: impl Into<String>,
        prerequisites: Vec<String>,
    ) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            prerequisites,
        }
    }

    /// Render the prerequisites for detail views, falling back to `None` so the
    /// line never renders empty.
    pub fn prerequisites_line(&self) -> String {
        if self.prerequisites.is_empty() {
            "None".to_string()
        } else {
            self.prerequisites.join(", ")
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.number, self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Partial update applied to a stored course. `None` keeps the current value.
pub struct CourseUpdate {
    pub title: Option<String>,
    pub prerequisites: Option<Vec<String>>,
}

impl CourseUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.prerequisites.is_none()
    }
}

/// Split a comma separated prerequisite list as typed by a user, dropping blank
/// entries.
pub fn split_prerequisites(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
