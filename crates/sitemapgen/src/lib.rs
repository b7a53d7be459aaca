//! XML sitemap generation.
//!
//! This crate turns URL entries into sitemap XML documents following the
//! sitemaps.org protocol, with the Google News and image extensions.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`UrlOptions`] and [`NewsUrlOptions`] builders producing immutable [`SitemapUrl`] entries
//! - [`SitemapGenerator`] batching entries into files of bounded size and count
//! - [`SitemapIndexGenerator`] emitting a `<sitemapindex>` over produced files
//!
//! Output goes through a [`sitemapgen_storage::Destination`], so the same
//! generator writes to disk or to memory in tests. Timestamps are formatted by
//! the [`W3cDateFormat`] carried in [`GeneratorOptions`].
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use chrono::Utc;
//! use sitemapgen::{NewsUrlOptions, Publication, SitemapGenerator};
//! use sitemapgen_storage::FsDestination;
//!
//! let mut generator = SitemapGenerator::new(
//!     "https://news.example.com",
//!     FsDestination::new(PathBuf::from("public")),
//! )?;
//! let publication = Publication::new("Example Times", "en")?;
//! generator.add_url(
//!     NewsUrlOptions::new("Launch", "https://news.example.com/launch", publication, Utc::now())?
//!         .keyword_list("space, rockets")
//!         .build()?,
//! )?;
//! let output = generator.write()?;
//! ```

mod entry;
mod error;
mod generator;
mod image;
mod index;
mod news;
mod render;

pub use entry::{ChangeFrequency, SitemapUrl, UrlOptions};
pub use error::{SitemapError, UrlError};
pub use generator::{
    GeneratorOptions, MAX_NEWS_URLS_PER_SITEMAP, MAX_SITEMAP_BYTES, MAX_URLS_PER_SITEMAP,
    SitemapFile, SitemapGenerator, WriteOutput,
};
pub use image::{Image, MAX_IMAGES_PER_URL};
pub use index::{MAX_SITEMAPS_PER_INDEX, SitemapIndexGenerator};
pub use news::{News, NewsAccess, NewsGenre, NewsUrlOptions, Publication};
pub use render::{IMAGE_NS, NEWS_NS, SITEMAP_NS};
pub use sitemapgen_dates::{DateError, Precision, W3cDateFormat};
pub use url::Url;
