use std::path::PathBuf;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::config::{DEFAULT_CSV_PATH, DEFAULT_EXPORT_PATH};
use crate::models::{split_prerequisites, Course, CourseUpdate};

/// What a path prompt does once the user confirms it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PathAction {
    /// Read a course file into the in-memory catalog.
    LoadIndex,
    /// Read a course file straight into the database.
    ImportStore,
    /// Write the catalog out in ascending order.
    Export,
    /// Switch to another database file.
    Connect,
}

impl PathAction {
    pub(crate) fn title(self) -> &'static str {
        match self {
            PathAction::LoadIndex => "Load Course File",
            PathAction::ImportStore => "Import File Into Database",
            PathAction::Export => "Export Catalog",
            PathAction::Connect => "Connect To Database",
        }
    }
}

/// Single line text prompt for a file path.
#[derive(Clone)]
pub(crate) struct PathForm {
    pub(crate) action: PathAction,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl PathForm {
    /// Seed the prompt with the usual file for the action.
    pub(crate) fn new(action: PathAction) -> Self {
        let value = match action {
            PathAction::LoadIndex | PathAction::ImportStore => DEFAULT_CSV_PATH,
            PathAction::Export => DEFAULT_EXPORT_PATH,
            PathAction::Connect => "",
        };
        Self::with_value(action, value)
    }

    pub(crate) fn with_value(action: PathAction, value: impl Into<String>) -> Self {
        Self {
            action,
            value: value.into(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn parse_path(&self) -> Result<PathBuf> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("A file name is required."));
        }
        Ok(PathBuf::from(trimmed))
    }
}

/// Query typed into the course finder.
#[derive(Default, Clone)]
pub(crate) struct LookupForm {
    pub(crate) query: String,
}

impl LookupForm {
    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.query.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.query.pop();
    }

    pub(crate) fn course_number(&self) -> Option<&str> {
        let trimmed = self.query.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Form state for updating a stored course.
#[derive(Default, Clone)]
pub(crate) struct CourseForm {
    pub(crate) number: String,
    pub(crate) title: String,
    pub(crate) prerequisites: String,
    pub(crate) active: CourseField,
    pub(crate) error: Option<String>,
}

/// Fields available within the course form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum CourseField {
    #[default]
    Number,
    Title,
    Prerequisites,
}

impl CourseForm {
    /// Populate the form from a course when editing it.
    pub(crate) fn from_course(course: &Course) -> Self {
        Self {
            number: course.number.clone(),
            title: course.title.clone(),
            prerequisites: course.prerequisites.join(", "),
            active: CourseField::Title,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            CourseField::Number => CourseField::Title,
            CourseField::Title => CourseField::Prerequisites,
            CourseField::Prerequisites => CourseField::Number,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            CourseField::Number => CourseField::Prerequisites,
            CourseField::Title => CourseField::Number,
            CourseField::Prerequisites => CourseField::Title,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.field_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.field_mut(self.active).pop();
    }

    fn field(&self, field: CourseField) -> &String {
        match field {
            CourseField::Number => &self.number,
            CourseField::Title => &self.title,
            CourseField::Prerequisites => &self.prerequisites,
        }
    }

    fn field_mut(&mut self, field: CourseField) -> &mut String {
        match field {
            CourseField::Number => &mut self.number,
            CourseField::Title => &mut self.title,
            CourseField::Prerequisites => &mut self.prerequisites,
        }
    }

    /// Validate the inputs. A blank title or prerequisite list keeps the
    /// stored value.
    pub(crate) fn parse_update(&self) -> Result<(String, CourseUpdate)> {
        let number = self.number.trim();
        if number.is_empty() {
            return Err(anyhow!("Course number is required."));
        }

        let title = self.title.trim();
        let prerequisites = split_prerequisites(&self.prerequisites);
        let update = CourseUpdate {
            title: (!title.is_empty()).then(|| title.to_string()),
            prerequisites: (!prerequisites.is_empty()).then_some(prerequisites),
        };

        if update.is_empty() {
            return Err(anyhow!("No updates were provided."));
        }
        Ok((number.to_string(), update))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: CourseField) -> Line<'static> {
        let value = self.field(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            match field {
                CourseField::Number => "<required>".to_string(),
                _ => "<keep current>".to_string(),
            }
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: CourseField) -> usize {
        self.field(field).chars().count()
    }
}

/// Pending deletion of a stored course.
#[derive(Clone)]
pub(crate) struct ConfirmCourseDelete {
    pub(crate) number: String,
    pub(crate) title: String,
}

impl ConfirmCourseDelete {
    pub(crate) fn from(course: &Course) -> Self {
        Self {
            number: course.number.clone(),
            title: course.title.clone(),
        }
    }
}

/// Pending wipe of the whole database.
#[derive(Clone)]
pub(crate) struct ConfirmClearStore {
    pub(crate) count: usize,
}
