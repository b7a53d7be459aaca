//! Mock destination implementation for testing.
//!
//! Provides [`MockDestination`] for unit testing without filesystem access.

use std::collections::HashSet;
use std::io::{self, Read, Write};
use std::sync::{Arc, RwLock};

use flate2::read::GzDecoder;

use crate::compress::{Compression, Counting, Encoder};
use crate::storage::{Destination, Sink, StorageError, StorageErrorKind, Written, validate_name};

const BACKEND: &str = "Mock";

#[derive(Debug, Clone)]
struct MockFile {
    name: String,
    bytes: Vec<u8>,
    compression: Compression,
}

/// In-memory destination for testing.
///
/// Files become visible once their sink is finished. Reopening a name replaces
/// the earlier file but keeps its position in [`MockDestination::names`].
///
/// # Example
///
/// ```ignore
/// use sitemapgen_storage::{Compression, Destination, MockDestination};
///
/// let destination = MockDestination::new().fail_on("sitemap2.xml");
/// let mut sink = destination.open("sitemap1.xml", Compression::None).unwrap();
/// sink.write_all(b"<urlset/>").unwrap();
/// sink.finish().unwrap();
///
/// assert_eq!(destination.read_to_string("sitemap1.xml").unwrap(), "<urlset/>");
/// assert!(destination.open("sitemap2.xml", Compression::None).is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockDestination {
    files: Arc<RwLock<Vec<MockFile>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl MockDestination {
    /// Create a new empty mock destination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make [`Destination::open`] fail with `PermissionDenied` for `name`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fail_on(self, name: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(name.into());
        self
    }

    /// Names of finished files, in the order they were first written.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.files
            .read()
            .unwrap()
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    /// Raw stored bytes of a finished file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files
            .read()
            .unwrap()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.bytes.clone())
    }

    /// Contents of a finished file as text, decompressed if it was gzipped.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned or the contents are not
    /// valid (optionally gzipped) UTF-8.
    #[must_use]
    pub fn read_to_string(&self, name: &str) -> Option<String> {
        let files = self.files.read().unwrap();
        let file = files.iter().find(|f| f.name == name)?;
        let mut text = String::new();
        let decoded = match file.compression {
            Compression::None => file.bytes.as_slice().read_to_string(&mut text),
            Compression::Gzip => GzDecoder::new(file.bytes.as_slice()).read_to_string(&mut text),
        };
        decoded.unwrap();
        Some(text)
    }

    fn store(&self, file: MockFile) {
        let mut files = self.files.write().unwrap();
        match files.iter_mut().find(|f| f.name == file.name) {
            Some(existing) => *existing = file,
            None => files.push(file),
        }
    }
}

impl Destination for MockDestination {
    fn open(&self, name: &str, compression: Compression) -> Result<Box<dyn Sink>, StorageError> {
        validate_name(name).map_err(|e| e.with_backend(BACKEND))?;
        if self.failing.read().unwrap().contains(name) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_path(name)
                .with_backend(BACKEND));
        }

        Ok(Box::new(MockSink {
            name: name.to_owned(),
            compression,
            encoder: Encoder::new(Counting::new(Vec::new()), compression),
            destination: self.clone(),
        }))
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}

struct MockSink {
    name: String,
    compression: Compression,
    encoder: Encoder<Counting<Vec<u8>>>,
    destination: MockDestination,
}

impl Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}

impl Sink for MockSink {
    fn finish(self: Box<Self>) -> Result<Written, StorageError> {
        let Self {
            name,
            compression,
            encoder,
            destination,
        } = *self;
        let (bytes, count) = encoder
            .finish()
            .map_err(|e| StorageError::io(e, None).with_backend(BACKEND))?
            .into_parts();

        destination.store(MockFile {
            name: name.clone(),
            bytes,
            compression,
        });
        Ok(Written {
            name,
            path: None,
            bytes: count,
        })
    }
}
