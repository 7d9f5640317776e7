//! Binary entry point that glues the SQLite store and the ordered index to the
//! TUI: resolve the data directory, start logging, open the store and drive
//! the Ratatui event loop until the user exits.
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use course_catalog::db::open_store;
use course_catalog::{run_app, App, AppPaths};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

fn main() -> Result<()> {
    let paths = AppPaths::resolve()?;
    setup_logging(&paths)?;
    tracing::info!(db = %paths.db_path.display(), "starting course catalog");

    let conn = open_store(&paths.db_path)?;
    let mut app = App::new(conn, paths.db_path.clone());
    run_app(&mut app)
}

/// Send `tracing` output to the log file. The filter comes from `RUST_LOG` and
/// defaults to `info`.
fn setup_logging(paths: &AppPaths) -> Result<()> {
    fs::create_dir_all(&paths.data_dir).context("failed to create data directory")?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
        .context("failed to open log file")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .context("failed to install logger")
}
