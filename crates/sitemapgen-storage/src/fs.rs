//! Filesystem destination.
//!
//! Provides [`FsDestination`] for writing sitemap files into a local directory.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::compress::{Compression, Counting, Encoder};
use crate::storage::{Destination, Sink, StorageError, Written, validate_name};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Writes each file as `{dir}/{name}`.
///
/// The directory is created on first use. Existing files of the same name are
/// truncated.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::io::Write;
/// use std::path::PathBuf;
/// use sitemapgen_storage::{Compression, Destination, FsDestination};
///
/// let destination = FsDestination::new(PathBuf::from("public"));
/// let mut sink = destination.open("sitemap.xml", Compression::None)?;
/// sink.write_all(b"<urlset/>")?;
/// let written = sink.finish()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FsDestination {
    dir: PathBuf,
}

impl FsDestination {
    /// Create a destination rooted at `dir`.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Destination for FsDestination {
    fn open(&self, name: &str, compression: Compression) -> Result<Box<dyn Sink>, StorageError> {
        validate_name(name).map_err(|e| e.with_backend(BACKEND))?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| StorageError::io(e, Some(self.dir.clone())).with_backend(BACKEND))?;

        let path = self.dir.join(name);
        let file = File::create(&path)
            .map_err(|e| StorageError::io(e, Some(path.clone())).with_backend(BACKEND))?;
        tracing::debug!(path = %path.display(), ?compression, "Opened output file");

        Ok(Box::new(FsSink {
            name: name.to_owned(),
            path,
            encoder: Encoder::new(Counting::new(BufWriter::new(file)), compression),
        }))
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}

struct FsSink {
    name: String,
    path: PathBuf,
    encoder: Encoder<Counting<BufWriter<File>>>,
}

impl Write for FsSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}

impl Sink for FsSink {
    fn finish(self: Box<Self>) -> Result<Written, StorageError> {
        let Self {
            name,
            path,
            encoder,
        } = *self;
        let (_writer, bytes) = encoder
            .finish()
            .map_err(|e| StorageError::io(e, Some(path.clone())).with_backend(BACKEND))?
            .into_parts();

        Ok(Written {
            name,
            path: Some(path),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::StorageErrorKind;

    #[test]
    fn test_open_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("public/maps");
        let destination = FsDestination::new(dir.clone());

        let mut sink = destination.open("sitemap.xml", Compression::None).unwrap();
        sink.write_all(b"<urlset/>").unwrap();
        let written = sink.finish().unwrap();

        assert_eq!(written.name, "sitemap.xml");
        assert_eq!(written.path, Some(dir.join("sitemap.xml")));
        assert_eq!(written.bytes, 9);
        assert_eq!(
            fs::read_to_string(dir.join("sitemap.xml")).unwrap(),
            "<urlset/>"
        );
    }

    #[test]
    fn test_open_truncates_existing_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("sitemap.xml"), "old contents, much longer").unwrap();
        let destination = FsDestination::new(temp.path().to_path_buf());

        let mut sink = destination.open("sitemap.xml", Compression::None).unwrap();
        sink.write_all(b"new").unwrap();
        sink.finish().unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("sitemap.xml")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_gzip_output() {
        let temp = TempDir::new().unwrap();
        let destination = FsDestination::new(temp.path().to_path_buf());

        let mut sink = destination
            .open("sitemap.xml.gz", Compression::Gzip)
            .unwrap();
        sink.write_all(b"<urlset/>").unwrap();
        let written = sink.finish().unwrap();

        let raw = fs::read(temp.path().join("sitemap.xml.gz")).unwrap();
        assert_eq!(written.bytes, raw.len() as u64);
        let mut decoded = String::new();
        GzDecoder::new(raw.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "<urlset/>");
    }

    #[test]
    fn test_rejects_nested_names() {
        let temp = TempDir::new().unwrap();
        let destination = FsDestination::new(temp.path().to_path_buf());

        let Err(err) = destination.open("../escape.xml", Compression::None) else {
            panic!("expected invalid name error");
        };
        assert_eq!(err.kind, StorageErrorKind::InvalidName);
        assert_eq!(err.backend, Some("Fs"));
    }
}
