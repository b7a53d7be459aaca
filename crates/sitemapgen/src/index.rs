//! Sitemap index documents.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use sitemapgen_dates::W3cDateFormat;
use sitemapgen_storage::{Compression, Destination, StorageError};
use url::Url;

use crate::entry::{check_within, normalize_base};
use crate::error::{SitemapError, UrlError};
use crate::generator::SitemapFile;
use crate::render::{IndexItem, render_index};

/// Protocol ceiling on sitemaps referenced by one index.
pub const MAX_SITEMAPS_PER_INDEX: usize = 50_000;

/// Builds a `<sitemapindex>` over sitemap files, in insertion order.
///
/// [`crate::SitemapGenerator`] uses this for multi-file output; it can also
/// index sitemaps produced elsewhere.
#[derive(Debug, Clone)]
pub struct SitemapIndexGenerator {
    base: Url,
    date_format: W3cDateFormat,
    compression: Compression,
    sitemaps: Vec<(Url, Option<DateTime<Utc>>)>,
}

impl SitemapIndexGenerator {
    /// Index whose sitemaps must live under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError`] if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, UrlError> {
        Ok(Self::from_base(normalize_base(base_url)?))
    }

    pub(crate) fn from_base(base: Url) -> Self {
        Self {
            base,
            date_format: W3cDateFormat::default(),
            compression: Compression::None,
            sitemaps: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_date_format(mut self, date_format: W3cDateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    /// Compress the index file. The name passed to
    /// [`SitemapIndexGenerator::write`] is used as given.
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Reference one sitemap file.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::OutsideBase`] if `loc` is not under the base URL and
    /// [`SitemapError::TooManySitemaps`] once the index is full.
    pub fn add_sitemap(
        &mut self,
        loc: Url,
        last_modified: Option<DateTime<Utc>>,
    ) -> Result<&mut Self, SitemapError> {
        check_within(&loc, &self.base)?;
        if self.sitemaps.len() >= MAX_SITEMAPS_PER_INDEX {
            return Err(SitemapError::TooManySitemaps {
                max: MAX_SITEMAPS_PER_INDEX,
            });
        }
        self.sitemaps.push((loc, last_modified));
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sitemaps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sitemaps.is_empty()
    }

    /// The complete index document.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::EmptyIndex`] if no sitemaps were added.
    pub fn render(&self) -> Result<String, SitemapError> {
        if self.sitemaps.is_empty() {
            return Err(SitemapError::EmptyIndex);
        }
        let items = self.sitemaps.iter().map(|(loc, last_modified)| IndexItem {
            loc: loc.as_str(),
            last_modified: *last_modified,
        });
        Ok(render_index(items, &self.date_format))
    }

    /// Render and store the index as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::EmptyIndex`] if no sitemaps were added and
    /// [`SitemapError::Storage`] when the destination fails.
    pub fn write<D: Destination + ?Sized>(
        &self,
        destination: &D,
        name: &str,
    ) -> Result<SitemapFile, SitemapError> {
        let document = self.render()?;
        let url = self.base.join(name).map_err(UrlError::from)?;

        let mut sink = destination.open(name, self.compression)?;
        sink.write_all(document.as_bytes()).map_err(|e| {
            StorageError::io(e, Some(PathBuf::from(name))).with_backend(destination.backend())
        })?;
        let written = sink.finish()?;

        tracing::debug!(name, sitemaps = self.sitemaps.len(), "Wrote sitemap index");
        Ok(SitemapFile {
            name: name.to_owned(),
            url,
            last_modified: self.sitemaps.iter().filter_map(|(_, lastmod)| *lastmod).max(),
            url_count: self.sitemaps.len(),
            bytes: written.bytes,
            path: written.path,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use sitemapgen_dates::Precision;
    use sitemapgen_storage::MockDestination;

    use super::*;

    fn loc(path: &str) -> Url {
        Url::parse(&format!("https://www.example.com/{path}")).unwrap()
    }

    #[test]
    fn test_render_in_insertion_order() {
        let mut index = SitemapIndexGenerator::new("https://www.example.com")
            .unwrap()
            .with_date_format(W3cDateFormat::new(Precision::Day));
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        index
            .add_sitemap(loc("sitemap2.xml"), Some(date))
            .unwrap()
            .add_sitemap(loc("sitemap1.xml"), None)
            .unwrap();

        assert_eq!(
            index.render().unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
             \x20 <sitemap>\n\
             \x20   <loc>https://www.example.com/sitemap2.xml</loc>\n\
             \x20   <lastmod>2024-05-01</lastmod>\n\
             \x20 </sitemap>\n\
             \x20 <sitemap>\n\
             \x20   <loc>https://www.example.com/sitemap1.xml</loc>\n\
             \x20 </sitemap>\n\
             </sitemapindex>"
        );
    }

    #[test]
    fn test_empty_index_is_an_error() {
        let index = SitemapIndexGenerator::new("https://www.example.com").unwrap();
        assert!(index.is_empty());
        assert!(matches!(index.render(), Err(SitemapError::EmptyIndex)));
    }

    #[test]
    fn test_rejects_sitemap_outside_base() {
        let mut index = SitemapIndexGenerator::new("https://www.example.com/blog").unwrap();
        let err = index.add_sitemap(loc("sitemap.xml"), None).unwrap_err();
        assert!(matches!(
            err,
            SitemapError::Url(UrlError::OutsideBase { .. })
        ));
    }

    #[test]
    fn test_write_reports_file() {
        let destination = MockDestination::new();
        let mut index = SitemapIndexGenerator::new("https://www.example.com").unwrap();
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        index
            .add_sitemap(loc("a.xml"), Some(newer))
            .unwrap()
            .add_sitemap(loc("b.xml"), Some(older))
            .unwrap();

        let file = index.write(&destination, "sitemap_index.xml").unwrap();

        assert_eq!(file.url.as_str(), "https://www.example.com/sitemap_index.xml");
        assert_eq!(file.url_count, 2);
        assert_eq!(file.last_modified, Some(newer));
        let text = destination.read_to_string("sitemap_index.xml").unwrap();
        assert_eq!(file.bytes, text.len() as u64);
        assert!(text.contains("<loc>https://www.example.com/a.xml</loc>"));
    }
}
