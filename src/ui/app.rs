use std::mem;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{
    clear_courses, course_exists, delete_course, fetch_courses, find_course, open_store,
    update_course,
};
use crate::index::CourseIndex;
use crate::loader::{export_courses_to_file, load_courses_from_file};
use crate::models::Course;
use crate::sync::{
    import_csv_into_store, load_index_from_store, rebuild_index_from_store, save_index_to_store,
};

use super::forms::{
    ConfirmClearStore, ConfirmCourseDelete, CourseField, CourseForm, LookupForm, PathAction,
    PathForm,
};
use super::helpers::{
    centered_rect, course_detail_lines, cursor_column, describe_error, step_selection,
    surface_error,
};
use super::screens::StoreScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Which list the main area shows.
enum Screen {
    /// Courses held by the in-memory index, in ascending order.
    Catalog,
    /// Rows currently in the database.
    Store(StoreScreen),
}

/// Modal state layered over the current screen.
enum Mode {
    Normal,
    Prompt(PathForm),
    Finding(LookupForm),
    EditingCourse(CourseForm),
    ConfirmCourseDelete(ConfirmCourseDelete),
    ConfirmClearStore(ConfirmClearStore),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. The open connection is ordinary session state:
/// connecting to another database swaps it here and nowhere else.
pub struct App {
    conn: Connection,
    db_path: PathBuf,
    index: CourseIndex,
    selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Start with an empty catalog over an already opened store.
    pub fn new(conn: Connection, db_path: PathBuf) -> Self {
        Self {
            conn,
            db_path,
            index: CourseIndex::new(),
            selected: 0,
            screen: Screen::Catalog,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// The in-memory catalog.
    pub fn index(&self) -> &CourseIndex {
        &self.index
    }

    /// Database file backing the current connection.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Prompt(form) => self.handle_prompt(code, form),
            Mode::Finding(form) => self.handle_find(code, form),
            Mode::EditingCourse(form) => self.handle_edit_course(code, form),
            Mode::ConfirmCourseDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::ConfirmClearStore(confirm) => self.handle_confirm_clear(code, confirm),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        if let Screen::Store(store) = &mut self.screen {
            match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Tab => {
                    self.screen = Screen::Catalog;
                    self.clear_status();
                }
                KeyCode::Up => store.move_selection(-1),
                KeyCode::Down => store.move_selection(1),
                KeyCode::PageUp => store.move_selection(-10),
                KeyCode::PageDown => store.move_selection(10),
                KeyCode::Char('e') => {
                    return match store.current_course() {
                        Some(course) => Mode::EditingCourse(CourseForm::from_course(course)),
                        None => Mode::EditingCourse(CourseForm::default()),
                    };
                }
                KeyCode::Char('d') => {
                    if let Some(course) = store.current_course() {
                        return Mode::ConfirmCourseDelete(ConfirmCourseDelete::from(course));
                    }
                    self.set_status("No course selected.", StatusKind::Error);
                }
                KeyCode::Char('C') => {
                    let count = store.courses.len();
                    if count == 0 {
                        self.set_status("The database is already empty.", StatusKind::Info);
                    } else {
                        return Mode::ConfirmClearStore(ConfirmClearStore { count });
                    }
                }
                KeyCode::Char('r') => {
                    if self.refresh_store_screen() {
                        self.set_status("Database view refreshed.", StatusKind::Info);
                    }
                }
                _ => {}
            }
            return Mode::Normal;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.index.len().saturating_sub(1),
            KeyCode::Tab => self.open_store_view(),
            KeyCode::Char('l') => return Mode::Prompt(PathForm::new(PathAction::LoadIndex)),
            KeyCode::Char('i') => return Mode::Prompt(PathForm::new(PathAction::ImportStore)),
            KeyCode::Char('x') => {
                if self.index.is_empty() {
                    self.set_status("No courses to export.", StatusKind::Error);
                } else {
                    return Mode::Prompt(PathForm::new(PathAction::Export));
                }
            }
            KeyCode::Char('c') => {
                let current = self.db_path.display().to_string();
                return Mode::Prompt(PathForm::with_value(PathAction::Connect, current));
            }
            KeyCode::Char('m') => self.report(|app| app.load_from_store()),
            KeyCode::Char('s') => self.report(|app| app.save_to_store()),
            KeyCode::Char('r') => self.report(|app| app.rebuild_from_store()),
            KeyCode::Char('f') | KeyCode::Char('/') => return Mode::Finding(LookupForm::default()),
            KeyCode::Char('e') => {
                return match self.current_course() {
                    Some(course) => Mode::EditingCourse(CourseForm::from_course(course)),
                    None => Mode::EditingCourse(CourseForm::default()),
                };
            }
            KeyCode::Char('d') => {
                let Some(course) = self.current_course() else {
                    self.set_status("No course selected.", StatusKind::Error);
                    return Mode::Normal;
                };
                let confirm = ConfirmCourseDelete::from(course);
                match course_exists(&self.conn, &confirm.number) {
                    Ok(true) => return Mode::ConfirmCourseDelete(confirm),
                    Ok(false) => self.set_status(
                        format!("{} is not in the database.", confirm.number),
                        StatusKind::Error,
                    ),
                    Err(err) => self.store_read_failed(&err),
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_prompt(&mut self, code: KeyCode, mut form: PathForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.run_path_action(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = describe_error(&err);
                    warn!(action = ?form.action, error = %message, "file action failed");
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Prompt(form)
    }

    fn handle_find(&mut self, code: KeyCode, mut form: LookupForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                if let Some(number) = form.course_number() {
                    self.show_course(number);
                }
                return Mode::Normal;
            }
            KeyCode::Char(ch) => form.push_char(ch),
            _ => {}
        }
        Mode::Finding(form)
    }

    fn handle_edit_course(&mut self, code: KeyCode, mut form: CourseForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_course_update(&form) {
                Ok(()) => {
                    self.refresh_store_screen();
                    return Mode::Normal;
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingCourse(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmCourseDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_course(&self.conn, &confirm.number) {
                    Ok(()) => {
                        info!(number = %confirm.number, "deleted course from store");
                        if self.refresh_store_screen() {
                            self.set_status(
                                format!(
                                    "Deleted {} from the database. Press r on the catalog to rebuild it.",
                                    confirm.number
                                ),
                                StatusKind::Info,
                            );
                        }
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                Mode::Normal
            }
            _ => Mode::ConfirmCourseDelete(confirm),
        }
    }

    fn handle_confirm_clear(&mut self, code: KeyCode, confirm: ConfirmClearStore) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Clear cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match clear_courses(&self.conn) {
                    Ok(deleted) => {
                        info!(deleted, "cleared store");
                        if self.refresh_store_screen() {
                            self.set_status(
                                format!("Deleted {deleted} course(s) from the database."),
                                StatusKind::Info,
                            );
                        }
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                Mode::Normal
            }
            _ => Mode::ConfirmClearStore(confirm),
        }
    }

    /// Run a store operation that reports its own success and show any error
    /// in the footer instead of aborting the UI.
    fn report(&mut self, action: impl FnOnce(&mut Self) -> Result<()>) {
        if let Err(err) = action(self) {
            let message = surface_error(&err);
            warn!(error = %describe_error(&err), "store operation failed");
            self.set_status(message, StatusKind::Error);
        }
    }

    fn run_path_action(&mut self, form: &PathForm) -> Result<()> {
        let path = form.parse_path()?;
        match form.action {
            PathAction::LoadIndex => self.load_file(&path),
            PathAction::ImportStore => self.import_file(&path),
            PathAction::Export => self.export_file(&path),
            PathAction::Connect => self.connect(path),
        }
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let report = load_courses_from_file(path, &mut self.index)?;
        let mut message = format!(
            "Loaded {} course(s) from {}.",
            report.loaded,
            path.display()
        );
        if report.duplicates > 0 {
            message.push_str(&format!(" {} duplicate(s) ignored.", report.duplicates));
        }
        if !report.skipped.is_empty() {
            message.push_str(&format!(
                " Skipped malformed line(s): {}.",
                join_numbers(&report.skipped)
            ));
        }
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn import_file(&mut self, path: &Path) -> Result<()> {
        let report = import_csv_into_store(&self.conn, path)?;
        let mut message = format!("Imported {} course(s) into the database.", report.inserted);
        if report.existing > 0 {
            message.push_str(&format!(" {} already stored.", report.existing));
        }
        if report.truncated > 0 {
            message.push_str(&format!(
                " Import limit reached, {} row(s) not read.",
                report.truncated
            ));
        }
        if !report.malformed.is_empty() {
            message.push_str(&format!(
                " Skipped malformed line(s): {}.",
                join_numbers(&report.malformed)
            ));
        }
        if self.refresh_store_screen() {
            self.set_status(message, StatusKind::Info);
        }
        Ok(())
    }

    fn export_file(&mut self, path: &Path) -> Result<()> {
        let written = export_courses_to_file(path, &self.index)?;
        self.set_status(
            format!("Exported {written} course(s) to {}.", path.display()),
            StatusKind::Info,
        );
        Ok(())
    }

    /// Open the new store before letting go of the current one, so a failed
    /// connection attempt leaves the session on the database it had. A file
    /// whose `courses` table cannot be read is refused the same way.
    fn connect(&mut self, path: PathBuf) -> Result<()> {
        let conn = open_store(&path)?;
        let courses = fetch_courses(&conn)
            .with_context(|| format!("{} is not a usable course database", path.display()))?;
        self.conn = conn;
        info!(path = %path.display(), "connected to store");
        self.set_status(
            format!("Connected to {}.", path.display()),
            StatusKind::Info,
        );
        self.db_path = path;
        if let Screen::Store(store) = &mut self.screen {
            store.replace(courses);
        }
        Ok(())
    }

    fn load_from_store(&mut self) -> Result<()> {
        let loaded = load_index_from_store(&self.conn, &mut self.index)?;
        self.set_status(
            format!("Loaded {loaded} new course(s) from the database."),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_to_store(&mut self) -> Result<()> {
        if self.index.is_empty() {
            self.set_status("The catalog is empty; nothing to save.", StatusKind::Error);
            return Ok(());
        }
        let report = save_index_to_store(&self.conn, &self.index)?;
        let mut message = format!(
            "Saved {} course(s) to the database in ascending order.",
            report.inserted
        );
        if !report.skipped.is_empty() {
            message.push_str(&format!(
                " Skipped pre-existing: {}.",
                report.skipped.join(", ")
            ));
        }
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn rebuild_from_store(&mut self) -> Result<()> {
        self.index = rebuild_index_from_store(&self.conn)?;
        self.selected = self.selected.min(self.index.len().saturating_sub(1));
        self.set_status(
            format!(
                "Rebuilt the catalog with {} course(s) from the database.",
                self.index.len()
            ),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_course_update(&mut self, form: &CourseForm) -> Result<()> {
        let (number, update) = form.parse_update()?;
        update_course(&self.conn, &number, &update)?;
        info!(%number, "updated course in store");
        let hint = if matches!(self.screen, Screen::Catalog) {
            " Press r to rebuild the catalog from it."
        } else {
            ""
        };
        self.set_status(
            format!("Course {number} updated in the database.{hint}"),
            StatusKind::Info,
        );
        Ok(())
    }

    /// Select a course by number. A course missing from the catalog is looked
    /// up in the database before reporting that it does not exist.
    fn show_course(&mut self, number: &str) {
        match self.index.find(number) {
            Some(course) => {
                let message = format!("{course} | Prerequisites: {}", course.prerequisites_line());
                if let Some(position) = self.index.iter().position(|c| c.number == number) {
                    self.selected = position;
                }
                self.set_status(message, StatusKind::Info);
            }
            None => match find_course(&self.conn, number) {
                Ok(Some(course)) => self.set_status(
                    format!(
                        "{course} | Prerequisites: {} | Only in the database; press m to load it.",
                        course.prerequisites_line()
                    ),
                    StatusKind::Info,
                ),
                Ok(None) => self.set_status("Course not found.", StatusKind::Error),
                Err(err) => self.store_read_failed(&err),
            },
        }
    }

    /// Switch to the database view. A store that cannot be read keeps the
    /// catalog on screen and says why.
    fn open_store_view(&mut self) {
        match fetch_courses(&self.conn) {
            Ok(courses) => {
                self.screen = Screen::Store(StoreScreen::new(courses));
                self.clear_status();
            }
            Err(err) => self.store_read_failed(&err),
        }
    }

    /// Re-read the rows behind the database view. Returns false, with the
    /// error already in the footer, when the store could not be read.
    fn refresh_store_screen(&mut self) -> bool {
        let Screen::Store(store) = &mut self.screen else {
            return true;
        };
        match fetch_courses(&self.conn) {
            Ok(courses) => {
                store.replace(courses);
                true
            }
            Err(err) => {
                self.store_read_failed(&err);
                false
            }
        }
    }

    fn store_read_failed(&mut self, err: &anyhow::Error) {
        warn!(error = %describe_error(err), "could not read courses from store");
        self.set_status(surface_error(err), StatusKind::Error);
    }

    fn current_course(&self) -> Option<&Course> {
        self.index.iter().nth(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.index.len(), offset);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Catalog => self.draw_catalog(frame, content_area),
            Screen::Store(store) => self.draw_store(frame, content_area, store),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Prompt(form) => self.draw_path_prompt(frame, area, form),
            Mode::Finding(form) => self.draw_finder(frame, area, form),
            Mode::EditingCourse(form) => self.draw_course_form(frame, area, form),
            Mode::ConfirmCourseDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmClearStore(confirm) => self.draw_confirm_clear(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_catalog(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            "Course Catalog ({} courses, tree height {})",
            self.index.len(),
            self.index.height()
        );
        if self.index.is_empty() {
            let message = Paragraph::new(
                "The catalog is empty. Press 'l' to load a course file or 'm' to load the database.",
            )
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .index
            .iter()
            .map(|course| ListItem::new(course.to_string()))
            .collect();
        self.draw_course_list(frame, area, title, items, self.selected, self.current_course());
    }

    fn draw_store(&self, frame: &mut Frame, area: Rect, store: &StoreScreen) {
        let title = format!(
            "Database {} ({} courses)",
            self.db_path.display(),
            store.courses.len()
        );
        if store.courses.is_empty() {
            let message = Paragraph::new("The database holds no courses. Press 'i' on the catalog to import a file.")
                .block(Block::default().title(title).borders(Borders::ALL))
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = store
            .courses
            .iter()
            .map(|course| ListItem::new(course.to_string()))
            .collect();
        self.draw_course_list(
            frame,
            area,
            title,
            items,
            store.selected,
            store.current_course(),
        );
    }

    /// List on the left, details of the highlighted course on the right.
    fn draw_course_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: String,
        items: Vec<ListItem>,
        selected: usize,
        current: Option<&Course>,
    ) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, columns[0], &mut state);

        let details = current.map(course_detail_lines).unwrap_or_default();
        let paragraph = Paragraph::new(details)
            .block(Block::default().title("Course").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, columns[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Prompt(_)) | (_, Mode::Finding(_)) => {
                &[("[Enter]", " Confirm   "), ("[Esc]", " Cancel")]
            }
            (_, Mode::EditingCourse(_)) => &[
                ("[Tab]", " Next Field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ConfirmCourseDelete(_)) | (_, Mode::ConfirmClearStore(_)) => {
                &[("[y]", " Confirm   "), ("[n]", " Cancel")]
            }
            (Screen::Store(_), Mode::Normal) => &[
                ("[↑↓]", " Navigate   "),
                ("[e]", " Update   "),
                ("[d]", " Delete   "),
                ("[C]", " Clear All   "),
                ("[r]", " Refresh   "),
                ("[Tab]", " Catalog   "),
                ("[q]", " Quit"),
            ],
            (Screen::Catalog, Mode::Normal) => &[
                ("[l]", " Load File   "),
                ("[m]", " Load DB   "),
                ("[s]", " Save DB   "),
                ("[f]", " Find   "),
                ("[e]", " Update   "),
                ("[d]", " Delete   "),
                ("[r]", " Rebuild   "),
                ("[i]", " Import   "),
                ("[x]", " Export   "),
                ("[c]", " Connect   "),
                ("[Tab]", " Database   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, label)| [Span::styled(*key, key_style), Span::raw(*label)])
            .collect();
        Line::from(spans)
    }

    fn draw_path_prompt(&self, frame: &mut Frame, area: Rect, form: &PathForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(form.action.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("File: "),
                Span::styled(form.value.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
        ];
        lines.push(hint_or_error(
            form.error.as_deref(),
            "Enter to confirm • Esc to cancel",
        ));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = cursor_column(inner, "File: ".len(), form.value.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_finder(&self, frame: &mut Frame, area: Rect, form: &LookupForm) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Find Course");
        let paragraph = Paragraph::new(Span::raw(format!("Course number: {}", form.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = cursor_column(inner, "Course number: ".len(), form.query.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_course_form(&self, frame: &mut Frame, area: Rect, form: &CourseForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Update Course In Database")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let fields = [
            ("Number", CourseField::Number),
            ("Title", CourseField::Title),
            ("Prerequisites", CourseField::Prerequisites),
        ];
        let mut lines: Vec<Line> = fields
            .iter()
            .map(|(name, field)| form.build_line(name, *field))
            .collect();
        lines.push(Line::from(""));
        lines.push(hint_or_error(
            form.error.as_deref(),
            "Blank title or prerequisites keep the stored value • Enter to save • Esc to cancel",
        ));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if let Some((row, (name, field))) = fields
            .iter()
            .enumerate()
            .find(|(_, (_, field))| *field == form.active)
        {
            let prefix = format!("{name}: ").len();
            frame.set_cursor_position((
                cursor_column(inner, prefix, form.value_len(*field)),
                inner.y.saturating_add(row as u16),
            ));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmCourseDelete) {
        let lines = vec![
            Line::from(format!(
                "Delete {}: {} from the database?",
                confirm.number, confirm.title
            )),
            Line::from(""),
            Line::from(Span::styled(
                "y to delete • n to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        draw_confirm(frame, area, "Delete Course", lines);
    }

    fn draw_confirm_clear(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmClearStore) {
        let lines = vec![
            Line::from(format!(
                "Delete all {} course(s) from the database?",
                confirm.count
            )),
            Line::from(""),
            Line::from(Span::styled(
                "y to clear • n to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        draw_confirm(frame, area, "Clear Database", lines);
    }
}

fn draw_confirm(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);
    let paragraph = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn hint_or_error(error: Option<&str>, hint: &str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Gray),
        )),
    }
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::db::{create_course, ensure_schema};

    fn app() -> App {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        App::new(conn, PathBuf::from(":memory:"))
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn clear_prompt(app: &mut App) {
        for _ in 0..64 {
            app.handle_key(KeyCode::Backspace).unwrap();
        }
    }

    fn status_text(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    #[test]
    fn load_file_then_find_selects_course() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.csv");
        fs::write(&path, "CS201,Data Structures,CS101\nCS101,Intro\nbad\n").unwrap();

        let mut app = app();
        app.handle_key(KeyCode::Char('l')).unwrap();
        clear_prompt(&mut app);
        type_text(&mut app, &path.display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.index().len(), 2);
        assert!(status_text(&app).contains("Skipped malformed line(s): 3"));

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "CS201");
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.selected, 1);
        assert!(status_text(&app).contains("Prerequisites: CS101"));

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "CS999");
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(status_text(&app), "Course not found.");
    }

    #[test]
    fn missing_file_keeps_prompt_open_and_index_untouched() {
        let mut app = app();
        app.handle_key(KeyCode::Char('l')).unwrap();
        clear_prompt(&mut app);
        type_text(&mut app, "/definitely/not/here.csv");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Prompt(_)));
        assert!(app.index().is_empty());
        assert!(status_text(&app).contains("could not open file"));
    }

    #[test]
    fn save_and_rebuild_round_trip_through_store() {
        let mut app = app();
        app.index.insert(Course::new("CS101", "Intro", Vec::new()));
        app.index.insert(Course::new("CS050", "Foundations", Vec::new()));

        app.handle_key(KeyCode::Char('s')).unwrap();
        assert!(status_text(&app).starts_with("Saved 2 course(s)"));

        create_course(&app.conn, &Course::new("CS300", "Systems", Vec::new())).unwrap();
        app.handle_key(KeyCode::Char('r')).unwrap();
        let numbers: Vec<_> = app.index().iter().map(|c| c.number.as_str()).collect();
        assert_eq!(numbers, ["CS050", "CS101", "CS300"]);
    }

    #[test]
    fn delete_from_store_screen_refreshes_rows() {
        let mut app = app();
        create_course(&app.conn, &Course::new("CS101", "Intro", Vec::new())).unwrap();
        create_course(&app.conn, &Course::new("CS201", "Data", Vec::new())).unwrap();

        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('d')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();

        match &app.screen {
            Screen::Store(store) => {
                assert_eq!(store.courses.len(), 1);
                assert_eq!(store.courses[0].number, "CS201");
            }
            Screen::Catalog => panic!("expected store screen"),
        }
    }

    #[test]
    fn failed_connect_keeps_current_store() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not-a-db.sqlite");
        fs::write(&bogus, "this is plainly not an sqlite file\n".repeat(64)).unwrap();

        let mut app = app();
        app.handle_key(KeyCode::Char('c')).unwrap();
        clear_prompt(&mut app);
        type_text(&mut app, &bogus.display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.db_path(), Path::new(":memory:"));
        assert!(matches!(app.mode, Mode::Prompt(_)));
    }

    #[test]
    fn connect_refuses_database_with_foreign_courses_table() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other.sqlite");
        Connection::open(&other)
            .unwrap()
            .execute_batch("CREATE TABLE courses (id INTEGER PRIMARY KEY, course_number TEXT);")
            .unwrap();

        let mut app = app();
        app.index.insert(Course::new("CS101", "Intro", Vec::new()));
        app.handle_key(KeyCode::Char('c')).unwrap();
        clear_prompt(&mut app);
        type_text(&mut app, &other.display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.db_path(), Path::new(":memory:"));
        assert!(matches!(app.mode, Mode::Prompt(_)));
        assert!(status_text(&app).contains("not a usable course database"));

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(!app.handle_key(KeyCode::Tab).unwrap());
        assert!(matches!(app.screen, Screen::Store(_)));
        assert_eq!(app.index().len(), 1);
    }

    #[test]
    fn unreadable_store_reports_error_and_keeps_session() {
        let mut app = app();
        app.index.insert(Course::new("CS101", "Intro", Vec::new()));
        app.handle_key(KeyCode::Tab).unwrap();
        assert!(matches!(app.screen, Screen::Store(_)));

        app.conn
            .execute_batch(
                "DROP TABLE course_prerequisites;
                 DROP TABLE courses;
                 CREATE TABLE courses (id INTEGER PRIMARY KEY, course_number TEXT);",
            )
            .unwrap();

        assert!(!app.handle_key(KeyCode::Char('r')).unwrap());
        assert!(matches!(app.screen, Screen::Store(_)));
        assert!(status_text(&app).contains("no such column"));

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(!app.handle_key(KeyCode::Tab).unwrap());
        assert!(matches!(app.screen, Screen::Catalog));
        assert!(status_text(&app).contains("no such column"));
        assert_eq!(app.index().len(), 1);
    }

    #[test]
    fn find_falls_back_to_stored_course() {
        let mut app = app();
        app.index.insert(Course::new("CS101", "Intro", Vec::new()));
        create_course(
            &app.conn,
            &Course::new("CS300", "Systems", vec!["CS101".into()]),
        )
        .unwrap();

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "CS300");
        app.handle_key(KeyCode::Enter).unwrap();

        let status = status_text(&app);
        assert!(status.contains("CS300"), "{status}");
        assert!(status.contains("Prerequisites: CS101"), "{status}");
        assert!(status.contains("Only in the database"), "{status}");
        assert!(matches!(app.status.as_ref().map(|s| &s.kind), Some(StatusKind::Info)));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn catalog_delete_needs_course_in_store() {
        let mut app = app();
        app.index.insert(Course::new("CS101", "Intro", Vec::new()));

        app.handle_key(KeyCode::Char('d')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), "CS101 is not in the database.");

        app.handle_key(KeyCode::Char('s')).unwrap();
        app.handle_key(KeyCode::Char('d')).unwrap();
        assert!(matches!(app.mode, Mode::ConfirmCourseDelete(_)));
    }
}
