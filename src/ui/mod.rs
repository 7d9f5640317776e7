//! Ratatui front end: application state and key handling live in `app`, the
//! modal forms in `forms`, and the raw terminal loop in `terminal`.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
