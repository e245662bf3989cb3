//! Error taxonomy for a vendoring run.
//!
//! Every error aborts the run. Variants carry the path (and position, where
//! one is known) so the CLI can point at the offending file or directive.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = VendorError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum VendorError {
    #[error("go.mod not found at {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("{}:{line}: {message}", path.display())]
    ManifestParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: no module directive (or an empty module path)", path.display())]
    MissingIdentity { path: PathBuf },

    #[error("source and destination are the same directory: {}", path.display())]
    SameRoot { path: PathBuf },

    #[error("destination {} could not be created fresh: {source}", path.display())]
    DestinationExists {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}:{column}: {message}", path.display())]
    SourceFileParse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VendorError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        VendorError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Attach a path to a raw `io::Result`.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| VendorError::io(path, e))
    }
}
