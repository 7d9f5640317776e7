//! Core library surface for the course catalog manager.
//!
//! The ordered index is the heart of the crate; the loader, the SQLite store
//! and the sync helpers feed it, and the TUI drives all of them. The `bin`
//! target only wires these pieces together.
pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod loader;
pub mod models;
pub mod sync;
pub mod ui;

/// The ordered in-memory index and its iterator.
pub use index::{CourseIndex, InOrder};

/// Domain types every layer manipulates.
pub use models::{Course, CourseUpdate};

pub use config::AppPaths;
pub use error::CatalogError;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
