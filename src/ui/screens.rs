use crate::models::Course;

use super::helpers::step_selection;

/// Snapshot of the database shown on the store screen. It is refreshed after
/// every store mutation rather than patched in place.
pub(crate) struct StoreScreen {
    pub(crate) courses: Vec<Course>,
    pub(crate) selected: usize,
}

impl StoreScreen {
    pub(crate) fn new(courses: Vec<Course>) -> Self {
        Self {
            courses,
            selected: 0,
        }
    }

    /// Swap in a fresh snapshot, keeping the selection on the same course
    /// number when it still exists.
    pub(crate) fn replace(&mut self, courses: Vec<Course>) {
        let focus = self.current_course().map(|course| course.number.clone());
        self.courses = courses;
        self.selected = focus
            .and_then(|number| self.courses.iter().position(|c| c.number == number))
            .unwrap_or_else(|| self.selected.min(self.courses.len().saturating_sub(1)));
    }

    pub(crate) fn current_course(&self) -> Option<&Course> {
        self.courses.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.courses.len(), offset);
    }
}
