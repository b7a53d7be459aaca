//! Destination traits and error types.
//!
//! A [`Destination`] hands out one [`Sink`] per output file. The caller writes
//! the document bytes into the sink and calls [`Sink::finish`] to commit it.
//! Dropping a sink without finishing releases the underlying handle; whatever
//! bytes reached the backend stay there.
//!
//! # File Names
//!
//! Names passed to [`Destination::open`] are flat file names such as
//! `"sitemap.xml"` or `"sitemap3.xml.gz"`. Backends that map names onto a
//! hierarchy reject names containing path separators or `..` components.

use std::io::Write;
use std::path::PathBuf;

use crate::compress::Compression;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Parent location does not exist and could not be created.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Name is not a plain file name.
    InvalidName,
    /// Backend has no room left.
    StorageFull,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (bad name, permission denied).
    #[default]
    Permanent,
    /// Retry immediately (timeout, interrupted write).
    Temporary,
}

/// Destination error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Path or file name context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create an invalid name error.
    #[must_use]
    pub fn invalid_name(name: &str) -> Self {
        Self::new(StorageErrorKind::InvalidName).with_path(name)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::StorageFull => StorageErrorKind::StorageFull,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            _ => StorageErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted => {
                ErrorStatus::Temporary
            }
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // "[Backend] Kind: source (path: sitemap.xml)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidName => "Invalid file name",
            StorageErrorKind::StorageFull => "Storage full",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };
        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// A committed output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    /// File name as passed to [`Destination::open`].
    pub name: String,
    /// Location on disk, for backends that have one.
    pub path: Option<PathBuf>,
    /// Number of bytes stored (after compression).
    pub bytes: u64,
}

/// Writable byte sink for one output file.
///
/// Obtained from [`Destination::open`]. Committed by [`Sink::finish`].
pub trait Sink: Write {
    /// Flush buffered bytes, finalize compression and release the handle.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the final write or flush fails.
    fn finish(self: Box<Self>) -> Result<Written, StorageError>;
}

/// Provider of output files.
///
/// Implementations commit to making each finished sink's contents available
/// under the name it was opened with, so callers can derive the file's public
/// URL from that name.
pub trait Destination: Send + Sync {
    /// Open a new sink for `name`, replacing any previous file of that name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if `name` is not a plain file name or the
    /// backend cannot create the file.
    fn open(&self, name: &str, compression: Compression) -> Result<Box<dyn Sink>, StorageError>;

    /// Backend identifier used in logs and errors.
    fn backend(&self) -> &'static str;
}

/// Reject names that are empty or would escape a flat namespace.
pub(crate) fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StorageError::invalid_name(name));
    }
    Ok(())
}
