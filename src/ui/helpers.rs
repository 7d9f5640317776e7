use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Line;

use crate::models::Course;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Column for a text cursor sitting after `prefix_len + value_len` characters.
/// Long input pins the cursor to the last column of `inner`.
pub(crate) fn cursor_column(inner: Rect, prefix_len: usize, value_len: usize) -> u16 {
    let offset = prefix_len.saturating_add(value_len);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    let last = inner.x.saturating_add(inner.width.saturating_sub(1));
    inner.x.saturating_add(offset).min(last)
}

/// Spell out the whole chain. File errors need the outer context to name the
/// path and the root cause to say what went wrong.
pub(crate) fn describe_error(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

/// Detail lines for one course.
pub(crate) fn course_detail_lines(course: &Course) -> Vec<Line<'static>> {
    vec![
        Line::from(format!("Number: {}", course.number)),
        Line::from(format!("Title: {}", course.title)),
        Line::from(""),
        Line::from(format!("Prerequisites: {}", course.prerequisites_line())),
    ]
}

/// Keep a list selection inside `len` after moving by `offset`.
pub(crate) fn step_selection(selected: usize, len: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    selected.saturating_add_signed(offset).min(len - 1)
}
