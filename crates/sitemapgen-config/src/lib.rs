//! Configuration management for sitemapgen.
//!
//! Parses `sitemap.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.base_url`
//! - `output.dir`

mod expand;

use serde::Deserialize;
use sitemapgen::{GeneratorOptions, MAX_SITEMAP_BYTES, MAX_URLS_PER_SITEMAP};
use sitemapgen_dates::{Precision, W3cDateFormat, parse_offset};
use sitemapgen_storage::Compression;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override site base URL.
    pub base_url: Option<String>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override gzip flag.
    pub gzip: Option<bool>,
    /// Override URLs per sitemap file.
    pub max_urls: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sitemap.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration.
    pub site: SiteConfig,
    /// Output configuration (directory is a relative string from TOML).
    output: OutputConfigRaw,
    /// Per-file limits and multi-file behavior.
    pub limits: LimitsConfig,
    /// Timestamp formatting.
    pub dates: DatesConfig,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL every sitemap entry must live under.
    pub base_url: String,
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    gzip: Option<bool>,
    file_name_prefix: Option<String>,
    index_separator: Option<String>,
    index_file_name: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug)]
pub struct OutputConfig {
    /// Directory sitemap files are written to.
    pub dir: PathBuf,
    /// Whether sitemap files are gzipped.
    pub gzip: bool,
    /// File name stem.
    pub file_name_prefix: String,
    /// Text between stem and number for multi-file output.
    pub index_separator: String,
    /// File name of the sitemap index.
    pub index_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let defaults = GeneratorOptions::default();
        Self {
            dir: PathBuf::from("."),
            gzip: false,
            file_name_prefix: defaults.file_name_prefix,
            index_separator: defaults.index_separator,
            index_file_name: defaults.index_file_name,
        }
    }
}

/// Limits configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// URLs per sitemap file.
    pub max_urls: usize,
    /// Write an empty sitemap when no URLs are given.
    pub allow_empty: bool,
    /// Split output into several files.
    pub allow_multiple: bool,
    /// Write a sitemap index for multi-file output.
    pub auto_index: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_urls: MAX_URLS_PER_SITEMAP,
            allow_empty: false,
            allow_multiple: true,
            auto_index: true,
        }
    }
}

/// Timestamp formatting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatesConfig {
    /// Precision name (`auto`, `year`, `month`, `day`, `minute`, `second`, `millisecond`).
    pub precision: String,
    /// Zone designator, `Z` or `+hh:mm`.
    pub timezone: String,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            precision: "auto".to_owned(),
            timezone: "Z".to_owned(),
        }
    }
}

impl DatesConfig {
    /// Build the timestamp formatter described by this section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an unknown precision or a
    /// malformed zone designator.
    pub fn date_format(&self) -> Result<W3cDateFormat, ConfigError> {
        let precision: Precision = self
            .precision
            .parse()
            .map_err(|e| ConfigError::Validation(format!("dates.precision: {e}")))?;
        let offset = parse_offset(&self.timezone)
            .map_err(|e| ConfigError::Validation(format!("dates.timezone: {e}")))?;
        Ok(W3cDateFormat::new(precision).with_offset(offset))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.base_url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a file name field to be a single path component.
fn require_file_name(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if value.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "{field} must be a file name, not a path"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sitemap.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated last, so a base URL may come from the CLI alone.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.site.base_url.clone_from(base_url);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
        if let Some(gzip) = settings.gzip {
            self.output_resolved.gzip = gzip;
        }
        if let Some(max_urls) = settings.max_urls {
            self.limits.max_urls = max_urls;
        }
    }

    /// Generator settings described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the `[dates]` section is invalid.
    pub fn generator_options(&self) -> Result<GeneratorOptions, ConfigError> {
        Ok(GeneratorOptions {
            max_urls: self.limits.max_urls,
            max_bytes: MAX_SITEMAP_BYTES,
            allow_empty: self.limits.allow_empty,
            allow_multiple: self.limits.allow_multiple,
            auto_index: self.limits.auto_index,
            compression: if self.output_resolved.gzip {
                Compression::Gzip
            } else {
                Compression::None
            },
            file_name_prefix: self.output_resolved.file_name_prefix.clone(),
            index_separator: self.output_resolved.index_separator.clone(),
            index_file_name: self.output_resolved.index_file_name.clone(),
            date_format: self.dates.date_format()?,
        })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            output: OutputConfigRaw::default(),
            limits: LimitsConfig::default(),
            dates: DatesConfig::default(),
            output_resolved: OutputConfig {
                dir: base.to_path_buf(),
                ..OutputConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically at the end of [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_output()?;
        self.validate_limits()?;
        self.dates.date_format()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.base_url, "site.base_url")?;
        require_http_url(&self.site.base_url, "site.base_url")?;
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        require_file_name(&self.output_resolved.file_name_prefix, "output.file_name_prefix")?;
        require_file_name(&self.output_resolved.index_file_name, "output.index_file_name")?;
        if self.output_resolved.index_separator.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "output.index_separator cannot contain path separators".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_limits(&self) -> Result<(), ConfigError> {
        let max_urls = self.limits.max_urls;
        if max_urls == 0 {
            return Err(ConfigError::Validation(
                "limits.max_urls must be greater than 0".to_owned(),
            ));
        }
        if max_urls > MAX_URLS_PER_SITEMAP {
            return Err(ConfigError::Validation(format!(
                "limits.max_urls cannot exceed {MAX_URLS_PER_SITEMAP}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.base_url = expand::expand_env(&self.site.base_url, "site.base_url")?;

        if let Some(ref dir) = self.output.dir {
            self.output.dir = Some(expand::expand_env(dir, "output.dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = OutputConfig::default();
        let output = &self.output;
        self.output_resolved = OutputConfig {
            dir: config_dir.join(output.dir.as_deref().unwrap_or(".")),
            gzip: output.gzip.unwrap_or(defaults.gzip),
            file_name_prefix: output
                .file_name_prefix
                .clone()
                .unwrap_or(defaults.file_name_prefix),
            index_separator: output
                .index_separator
                .clone()
                .unwrap_or(defaults.index_separator),
            index_file_name: output
                .index_file_name
                .clone()
                .unwrap_or(defaults.index_file_name),
        };
    }
}
