//! Output destinations for sitemapgen.
//!
//! This crate provides a [`Destination`] trait that hands out one writable
//! [`Sink`] per output file, decoupling sitemap generation from where the
//! bytes end up. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Optional gzip** applied uniformly by every backend
//! - **Scoped handles**: each sink is released as soon as its file is finished
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Destination`] trait with `open()` returning a [`Sink`]
//! - [`FsDestination`] writing into a local directory
//! - [`MockDestination`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::io::Write;
//! use std::path::PathBuf;
//! use sitemapgen_storage::{Compression, Destination, FsDestination};
//!
//! let destination = FsDestination::new(PathBuf::from("public"));
//! let mut sink = destination.open("sitemap.xml.gz", Compression::Gzip)?;
//! sink.write_all(xml.as_bytes())?;
//! let written = sink.finish()?;
//! ```

mod compress;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use compress::Compression;
pub use fs::FsDestination;
#[cfg(feature = "mock")]
pub use mock::MockDestination;
pub use storage::{Destination, ErrorStatus, Sink, StorageError, StorageErrorKind, Written};
