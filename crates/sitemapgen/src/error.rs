//! Error types for sitemap generation.

use sitemapgen_storage::StorageError;

/// Configuration error raised while building a URL entry or adding it to a
/// generator.
///
/// These are raised as soon as the offending value is supplied or the entry is
/// built, never deferred to write time.
#[derive(Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum UrlError {
    /// Location is not an absolute, well-formed URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Location uses a scheme other than http or https.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// Mandatory field is empty.
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    /// Priority outside `0.0..=1.0`.
    #[error("priority must be between 0.0 and 1.0, got {0}")]
    PriorityOutOfRange(f64),

    /// Unknown change frequency name.
    #[error("invalid change frequency: {0}")]
    InvalidChangeFrequency(String),

    /// Unknown news genre name.
    #[error("invalid news genre: {0}")]
    InvalidGenre(String),

    /// Unknown news access name.
    #[error("invalid news access: {0}")]
    InvalidAccess(String),

    /// Publication language is not an ISO 639 code.
    #[error("invalid publication language: {0}")]
    InvalidLanguage(String),

    /// Publication name carries a trailing parenthetical.
    #[error("publication name must not end with a parenthetical: {0}")]
    InvalidPublicationName(String),

    /// More images than one URL entry may carry.
    #[error("too many images for one URL: {count} (max {max})")]
    TooManyImages {
        /// Images supplied.
        count: usize,
        /// Protocol ceiling.
        max: usize,
    },

    /// Location lies outside the generator's base URL.
    #[error("URL {url} is outside base URL {base}")]
    OutsideBase {
        /// Offending location.
        url: String,
        /// Configured base.
        base: String,
    },
}

/// Error from sitemap or sitemap index generation.
#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    /// Invalid entry or base URL.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// Writing to the destination failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Generator options are inconsistent.
    #[error("invalid generator options: {0}")]
    InvalidOptions(String),

    /// No URLs were added and empty sitemaps are not allowed.
    #[error("no URLs added, sitemap would be empty")]
    Empty,

    /// Output needs more than one file but multiple files are disabled.
    #[error("{count} URLs need more than one sitemap file (max {max} per file) but multiple sitemaps are disabled")]
    TooManyUrls {
        /// URLs added so far.
        count: usize,
        /// Per-file ceiling.
        max: usize,
    },

    /// Asked to write an index over zero sitemaps.
    #[error("sitemap index must reference at least one sitemap")]
    EmptyIndex,

    /// Index would reference more sitemaps than the protocol allows.
    #[error("sitemap index cannot reference more than {max} sitemaps")]
    TooManySitemaps {
        /// Protocol ceiling.
        max: usize,
    },
}
