use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or writing catalog files. The index itself never
/// fails; these only come from the file boundary.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not open file '{}'", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not create file '{}'", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
