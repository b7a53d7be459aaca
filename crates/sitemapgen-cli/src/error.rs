//! CLI error types.

use sitemapgen::SitemapError;
use sitemapgen_config::ConfigError;

use crate::commands::EntryError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Sitemap(#[from] SitemapError),

    #[error("line {line}: {source}")]
    Input {
        line: usize,
        #[source]
        source: EntryError,
    },
}
