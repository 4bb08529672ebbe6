//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::DomainError;

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.manifest_files(&dir, "fs")
    ///     .with_path_context("scan manifest directory", &dir)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait attaching the manifest file to a domain error.
pub trait ManifestResultExt<T> {
    fn in_manifest(self, path: &Path) -> ApplicationResult<T>;
}

impl<T, E: Into<DomainError>> ManifestResultExt<T> for Result<T, E> {
    fn in_manifest(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Manifest {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
