//! # Export Errors
//!
//! Unlike extraction faults, reconciliation faults abort the run: a partial
//! export must never be committed as if it were complete.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors raised while reconciling recovered scripts with the output
/// directory
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Manifest error: {0}")]
    Manifest(String),
}

impl ExportError {
    pub fn create_dir(path: &Path, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn rename(from: &Path, to: &Path, source: std::io::Error) -> Self {
        Self::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    }

    pub fn remove(path: &Path, source: std::io::Error) -> Self {
        Self::Remove {
            path: path.to_path_buf(),
            source,
        }
    }
}
