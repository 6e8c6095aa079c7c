//! Error type shared by the structure and metadata readers.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a structure or metadata file.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper around operating-system level I/O failures.
    #[error("I/O error for {path_desc}: {source}", path_desc = PathDisplay(path))]
    Io {
        /// Path to the file involved in the failed operation, if any.
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// An input line could not be understood as the expected record.
    #[error(
        "failed to parse {format} {path_desc}: {details} (line {line_number})",
        path_desc = PathDisplay(path)
    )]
    Parse {
        /// Name of the textual format (`"PDB"` or `"mmCIF"`).
        format: &'static str,
        path: Option<PathBuf>,
        /// One-based line number where parsing failed.
        line_number: usize,
        details: String,
    },
}

impl Error {
    pub fn from_io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { path, source }
    }

    pub fn parse(
        format: &'static str,
        path: Option<PathBuf>,
        line_number: usize,
        details: impl Into<String>,
    ) -> Self {
        Self::Parse {
            format,
            path,
            line_number,
            details: details.into(),
        }
    }

    /// Attach a path to an error that was produced while reading from a string.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Io { path: None, source } => Self::Io {
                path: Some(path.into()),
                source,
            },
            Self::Parse {
                format,
                path: None,
                line_number,
                details,
            } => Self::Parse {
                format,
                path: Some(path.into()),
                line_number,
                details,
            },
            other => other,
        }
    }
}

/// Prints `file '<path>'` when a path is known and `stream source` otherwise.
struct PathDisplay<'a>(&'a Option<PathBuf>);

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "file '{}'", p.display()),
            None => write!(f, "stream source"),
        }
    }
}
