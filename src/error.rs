use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("bundled resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("solver error: {0}")]
    Solver(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

impl DatasetError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        DatasetError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, line: u64, message: impl Into<String>) -> Self {
        DatasetError::Parse {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    /// Opening a bundled file: a missing file is an installation defect.
    pub(crate) fn resource(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            DatasetError::ResourceNotFound(path.to_path_buf())
        } else {
            DatasetError::io(path, source)
        }
    }
}
