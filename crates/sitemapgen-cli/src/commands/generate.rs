//! `sitemapgen generate` command implementation.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::Args;
use sitemapgen::{SitemapFile, SitemapGenerator, WriteOutput};
use sitemapgen_config::{CliSettings, Config};
use sitemapgen_dates::W3cDateFormat;
use sitemapgen_storage::{Destination, FsDestination};

use super::input::{EntryError, parse_entry};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to configuration file (default: auto-discover sitemap.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines file with one entry per line (default: stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Base URL every entry must live under (overrides config).
    #[arg(long, env = "SITEMAPGEN_BASE_URL")]
    base_url: Option<String>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Gzip sitemap files (overrides config).
    #[arg(long)]
    gzip: bool,

    /// URLs per sitemap file (overrides config).
    #[arg(long)]
    max_urls: Option<usize>,

    /// Enable verbose output (per-file logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, an input line is invalid, or
    /// writing a file fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_url: self.base_url,
            output_dir: self.output,
            gzip: self.gzip.then_some(true),
            max_urls: self.max_urls,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let options = config.generator_options()?;
        let dates = options.date_format;

        output.info(&format!("Base URL: {}", config.site.base_url));
        output.info(&format!("Output: {}", config.output_resolved.dir.display()));

        let destination = FsDestination::new(config.output_resolved.dir.clone());
        let mut generator =
            SitemapGenerator::with_options(&config.site.base_url, destination, options)?;
        match self.input.as_deref() {
            Some(path) if path != Path::new("-") => {
                add_entries(&mut generator, BufReader::new(File::open(path)?), &dates)?;
            }
            _ => add_entries(&mut generator, io::stdin().lock(), &dates)?,
        }

        if generator.is_empty() {
            output.warning("No entries read");
        }
        let written = generator.write()?;
        report(&output, &written);
        Ok(())
    }
}

/// Add every non-blank line of `reader` to `generator`, in order.
fn add_entries<D: Destination>(
    generator: &mut SitemapGenerator<D>,
    reader: impl BufRead,
    dates: &W3cDateFormat,
) -> Result<(), CliError> {
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_entry(&line, dates)
            .and_then(|url| generator.add_url(url).map(|_| ()).map_err(EntryError::from));
        entry.map_err(|source| CliError::Input {
            line: index + 1,
            source,
        })?;
    }
    tracing::info!(urls = generator.len(), "Read entries");
    Ok(())
}

fn report(output: &Output, written: &WriteOutput) {
    for file in written.files() {
        output.file(&file.name, &describe(file));
    }
    let noun = if written.sitemaps.len() == 1 {
        "sitemap"
    } else {
        "sitemaps"
    };
    let suffix = if written.index.is_some() {
        " and an index"
    } else {
        ""
    };
    output.success(&format!(
        "Wrote {} {noun}{suffix}",
        written.sitemaps.len()
    ));
}

fn describe(file: &SitemapFile) -> String {
    format!("({} entries, {} bytes)", file.url_count, file.bytes)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sitemapgen::GeneratorOptions;
    use sitemapgen_storage::MockDestination;
    use tempfile::TempDir;

    use super::*;

    fn generator(max_urls: usize) -> SitemapGenerator<MockDestination> {
        SitemapGenerator::with_options(
            "https://www.example.com",
            MockDestination::new(),
            GeneratorOptions {
                max_urls,
                ..GeneratorOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_add_entries_skips_blank_lines() {
        let mut generator = generator(10);
        let input = "{\"loc\": \"https://www.example.com/a\"}\n\n   \n{\"loc\": \"https://www.example.com/b\"}\n";

        add_entries(&mut generator, input.as_bytes(), &W3cDateFormat::default()).unwrap();

        assert_eq!(generator.len(), 2);
    }

    #[test]
    fn test_add_entries_reports_line_number() {
        let mut generator = generator(10);
        let input = "{\"loc\": \"https://www.example.com/a\"}\n\n{\"loc\": \"https://other.example.com/\"}\n";

        let err = add_entries(&mut generator, input.as_bytes(), &W3cDateFormat::default())
            .unwrap_err();

        assert!(matches!(err, CliError::Input { line: 3, .. }));
        assert!(err.to_string().starts_with("line 3: URL https://other.example.com/ is outside"));
    }

    #[test]
    fn test_describe() {
        let mut generator = generator(10);
        add_entries(
            &mut generator,
            "{\"loc\": \"https://www.example.com/a\"}".as_bytes(),
            &W3cDateFormat::default(),
        )
        .unwrap();
        let written = generator.write().unwrap();

        let file = &written.sitemaps[0];
        assert_eq!(describe(file), format!("(1 entries, {} bytes)", file.bytes));
    }

    #[test]
    fn test_execute_writes_files() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("sitemap.toml");
        std::fs::write(
            &config,
            "[site]\nbase_url = \"https://www.example.com/\"\n\n[output]\ndir = \"public\"\n",
        )
        .unwrap();
        let input = dir.path().join("urls.jsonl");
        std::fs::write(
            &input,
            "{\"loc\": \"https://www.example.com/a\"}\n{\"loc\": \"https://www.example.com/b\"}\n{\"loc\": \"https://www.example.com/c\"}\n",
        )
        .unwrap();

        let args = GenerateArgs {
            config: Some(config),
            input: Some(input),
            base_url: None,
            output: None,
            gzip: false,
            max_urls: Some(2),
            verbose: false,
        };
        args.execute().unwrap();

        let public = dir.path().join("public");
        assert!(public.join("sitemap1.xml").exists());
        assert!(public.join("sitemap2.xml").exists());
        let index = std::fs::read_to_string(public.join("sitemap_index.xml")).unwrap();
        assert!(index.contains("<loc>https://www.example.com/sitemap2.xml</loc>"));
    }
}
