//! Batching sitemap generator.
//!
//! [`SitemapGenerator`] buffers entries in arrival order and, on
//! [`SitemapGenerator::write`], splits them into files of at most
//! [`GeneratorOptions::max_urls`] entries and [`GeneratorOptions::max_bytes`]
//! uncompressed bytes. A single file is named `{prefix}.xml`; several files are
//! named `{prefix}{separator}{n}.xml` starting at 1, followed by a sitemap
//! index when [`GeneratorOptions::auto_index`] is set.

use std::io::Write;
use std::ops::Range;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use sitemapgen_dates::W3cDateFormat;
use sitemapgen_storage::{Compression, Destination, StorageError};
use url::Url;

use crate::entry::{SitemapUrl, check_within, normalize_base};
use crate::error::{SitemapError, UrlError};
use crate::index::SitemapIndexGenerator;
use crate::render::{Namespaces, URLSET_CLOSE, render_url, urlset_open};

/// Protocol ceiling on entries per sitemap file.
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;

/// Google News ceiling on entries per news sitemap file.
pub const MAX_NEWS_URLS_PER_SITEMAP: usize = 1_000;

/// Protocol ceiling on uncompressed bytes per sitemap file.
pub const MAX_SITEMAP_BYTES: usize = 10 * 1024 * 1024;

/// Generator settings.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Entries per file, `1..=50_000`.
    pub max_urls: usize,
    /// Uncompressed bytes per file before a new file is started.
    pub max_bytes: usize,
    /// Write an empty `sitemap.xml` instead of failing when no URLs were added.
    pub allow_empty: bool,
    /// Split into several files; when false, exceeding one file is an error.
    pub allow_multiple: bool,
    /// Write a sitemap index when more than one file was produced.
    pub auto_index: bool,
    /// Compression for sitemap files (the index is never compressed).
    pub compression: Compression,
    /// File name stem, `"sitemap"` by default.
    pub file_name_prefix: String,
    /// Text between stem and number for multi-file output.
    pub index_separator: String,
    /// File name of the sitemap index.
    pub index_file_name: String,
    /// Formatter for every timestamp in the output.
    pub date_format: W3cDateFormat,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            max_urls: MAX_URLS_PER_SITEMAP,
            max_bytes: MAX_SITEMAP_BYTES,
            allow_empty: false,
            allow_multiple: true,
            auto_index: true,
            compression: Compression::None,
            file_name_prefix: "sitemap".to_owned(),
            index_separator: String::new(),
            index_file_name: "sitemap_index.xml".to_owned(),
            date_format: W3cDateFormat::default(),
        }
    }
}

impl GeneratorOptions {
    /// Defaults with the Google News per-file ceiling.
    #[must_use]
    pub fn news() -> Self {
        Self {
            max_urls: MAX_NEWS_URLS_PER_SITEMAP,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), SitemapError> {
        let invalid = |message: &str| Err(SitemapError::InvalidOptions(message.to_owned()));
        if self.max_urls == 0 || self.max_urls > MAX_URLS_PER_SITEMAP {
            return invalid("max_urls must be between 1 and 50000");
        }
        if self.max_bytes == 0 || self.max_bytes > MAX_SITEMAP_BYTES {
            return invalid("max_bytes must be between 1 and 10485760");
        }
        if self.file_name_prefix.is_empty() {
            return invalid("file_name_prefix cannot be empty");
        }
        if self.index_file_name.is_empty() {
            return invalid("index_file_name cannot be empty");
        }
        Ok(())
    }

    /// File name for the `number`th file, or the single-file name for `None`.
    fn file_name(&self, number: Option<usize>) -> String {
        let extension = self.compression.extension();
        match number {
            None => format!("{}.xml{extension}", self.file_name_prefix),
            Some(n) => format!(
                "{}{}{n}.xml{extension}",
                self.file_name_prefix, self.index_separator
            ),
        }
    }
}

/// One file produced by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapFile {
    /// File name within the destination.
    pub name: String,
    /// Public URL, the file name resolved against the base URL.
    pub url: Url,
    /// Latest `lastmod` or news publication date among the file's entries.
    pub last_modified: Option<DateTime<Utc>>,
    /// Entries (or, for an index, sitemaps) in the file.
    pub url_count: usize,
    /// Bytes stored, after compression.
    pub bytes: u64,
    /// Location on disk, for backends that have one.
    pub path: Option<PathBuf>,
}

/// Files produced by [`SitemapGenerator::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutput {
    /// Sitemap files in production order.
    pub sitemaps: Vec<SitemapFile>,
    /// Index over `sitemaps`, present only for multi-file output.
    pub index: Option<SitemapFile>,
}

impl WriteOutput {
    /// Every produced file: sitemaps first, then the index.
    pub fn files(&self) -> impl Iterator<Item = &SitemapFile> {
        self.sitemaps.iter().chain(self.index.as_ref())
    }
}

/// Buffers sitemap entries and writes them as one or more files.
///
/// Not synchronized: use one generator per sitemap set.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use sitemapgen::{SitemapGenerator, UrlOptions};
/// use sitemapgen_storage::FsDestination;
///
/// let dir = tempfile::tempdir()?;
/// let mut generator = SitemapGenerator::new(
///     "https://www.example.com",
///     FsDestination::new(dir.path().to_path_buf()),
/// )?;
/// generator.add_url(UrlOptions::new("https://www.example.com/")?.build()?)?;
///
/// let output = generator.write()?;
/// assert_eq!(output.sitemaps[0].name, "sitemap.xml");
/// assert!(output.index.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SitemapGenerator<D> {
    base: Url,
    destination: D,
    options: GeneratorOptions,
    urls: Vec<SitemapUrl>,
}

impl<D: Destination> SitemapGenerator<D> {
    /// Generator with default options.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::Url`] if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, destination: D) -> Result<Self, SitemapError> {
        Self::with_options(base_url, destination, GeneratorOptions::default())
    }

    /// # Errors
    ///
    /// Returns [`SitemapError::Url`] for a bad base URL or
    /// [`SitemapError::InvalidOptions`] for out-of-range options.
    pub fn with_options(
        base_url: &str,
        destination: D,
        options: GeneratorOptions,
    ) -> Result<Self, SitemapError> {
        options.validate()?;
        Ok(Self {
            base: normalize_base(base_url)?,
            destination,
            options,
            urls: Vec::new(),
        })
    }

    /// Normalized base URL (path always ends in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    #[must_use]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    #[must_use]
    pub fn destination(&self) -> &D {
        &self.destination
    }

    /// Number of buffered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Append one entry.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::OutsideBase`] if the entry's location is not under
    /// the base URL, or [`SitemapError::TooManyUrls`] if multiple files are
    /// disabled and the single file is full.
    pub fn add_url(&mut self, url: SitemapUrl) -> Result<&mut Self, SitemapError> {
        check_within(url.loc(), &self.base)?;
        if !self.options.allow_multiple && self.urls.len() >= self.options.max_urls {
            return Err(SitemapError::TooManyUrls {
                count: self.urls.len() + 1,
                max: self.options.max_urls,
            });
        }
        self.urls.push(url);
        Ok(self)
    }

    /// Append entries in iteration order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Same as [`SitemapGenerator::add_url`].
    pub fn add_urls(
        &mut self,
        urls: impl IntoIterator<Item = SitemapUrl>,
    ) -> Result<&mut Self, SitemapError> {
        for url in urls {
            self.add_url(url)?;
        }
        Ok(self)
    }

    /// Render and store every file, plus the index for multi-file output.
    ///
    /// Files already stored before a failing one are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::Empty`] when no URLs were added and
    /// `allow_empty` is off, [`SitemapError::TooManyUrls`] when the output
    /// needs several files but `allow_multiple` is off, and
    /// [`SitemapError::Storage`] when the destination fails.
    pub fn write(&self) -> Result<WriteOutput, SitemapError> {
        if self.urls.is_empty() && !self.options.allow_empty {
            return Err(SitemapError::Empty);
        }

        let dates = &self.options.date_format;
        let fragments: Vec<String> = self.urls.iter().map(|url| render_url(url, dates)).collect();
        let groups = self.partition(&fragments);
        if groups.len() > 1 && !self.options.allow_multiple {
            return Err(SitemapError::TooManyUrls {
                count: self.urls.len(),
                max: self.options.max_urls,
            });
        }

        let numbered = groups.len() > 1;
        let mut sitemaps = Vec::with_capacity(groups.len());
        for (i, range) in groups.into_iter().enumerate() {
            let name = self.options.file_name(numbered.then_some(i + 1));
            sitemaps.push(self.write_group(name, &self.urls[range.clone()], &fragments[range])?);
        }

        let index = if numbered && self.options.auto_index {
            Some(self.write_index(&sitemaps)?)
        } else {
            None
        };

        tracing::info!(
            urls = self.urls.len(),
            files = sitemaps.len(),
            index = index.is_some(),
            "Wrote sitemaps"
        );
        Ok(WriteOutput { sitemaps, index })
    }

    /// Write a sitemap index over `sitemaps` as
    /// [`GeneratorOptions::index_file_name`].
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::EmptyIndex`] for an empty slice,
    /// [`SitemapError::TooManySitemaps`] past the index ceiling and
    /// [`SitemapError::Storage`] when the destination fails.
    pub fn write_index(&self, sitemaps: &[SitemapFile]) -> Result<SitemapFile, SitemapError> {
        let mut index = SitemapIndexGenerator::from_base(self.base.clone())
            .with_date_format(self.options.date_format);
        for sitemap in sitemaps {
            index.add_sitemap(sitemap.url.clone(), sitemap.last_modified)?;
        }
        index.write(&self.destination, &self.options.index_file_name)
    }

    /// Split fragment indices into files, keeping arrival order.
    fn partition(&self, fragments: &[String]) -> Vec<Range<usize>> {
        if fragments.is_empty() {
            return vec![0..0];
        }

        let overhead = urlset_open(Namespaces::ALL).len() + URLSET_CLOSE.len();
        let mut groups = Vec::new();
        let mut start = 0;
        let mut bytes = overhead;
        for (i, fragment) in fragments.iter().enumerate() {
            let count = i - start;
            let full = count == self.options.max_urls;
            let oversize = count > 0 && bytes + fragment.len() > self.options.max_bytes;
            if full || oversize {
                if oversize && !full {
                    tracing::warn!(
                        urls = count,
                        bytes,
                        "Sitemap reached the byte ceiling before the entry limit"
                    );
                }
                groups.push(start..i);
                start = i;
                bytes = overhead;
            }
            if overhead + fragment.len() > self.options.max_bytes {
                tracing::warn!(
                    loc = %self.urls[i].loc(),
                    bytes = fragment.len(),
                    "Entry alone exceeds the sitemap byte ceiling"
                );
            }
            bytes += fragment.len();
        }
        groups.push(start..fragments.len());
        groups
    }

    fn write_group(
        &self,
        name: String,
        urls: &[SitemapUrl],
        fragments: &[String],
    ) -> Result<SitemapFile, SitemapError> {
        let namespaces = urls
            .iter()
            .map(Namespaces::of)
            .fold(Namespaces::default(), Namespaces::union);
        let url = self.base.join(&name).map_err(UrlError::from)?;
        let backend = self.destination.backend();
        let io_error = |err: std::io::Error| {
            StorageError::io(err, Some(PathBuf::from(&name))).with_backend(backend)
        };

        let mut sink = self.destination.open(&name, self.options.compression)?;
        sink.write_all(urlset_open(namespaces).as_bytes())
            .map_err(io_error)?;
        for fragment in fragments {
            sink.write_all(fragment.as_bytes()).map_err(io_error)?;
        }
        sink.write_all(URLSET_CLOSE.as_bytes()).map_err(io_error)?;
        let written = sink.finish()?;

        tracing::debug!(name = %name, urls = urls.len(), bytes = written.bytes, "Wrote sitemap");
        Ok(SitemapFile {
            name,
            url,
            last_modified: urls.iter().filter_map(SitemapUrl::latest_date).max(),
            url_count: urls.len(),
            bytes: written.bytes,
            path: written.path,
        })
    }
}
