//! JSON-lines entry records.
//!
//! Each non-blank line is one object:
//!
//! ```json
//! {"loc": "https://www.example.com/", "lastmod": "2024-01-01", "changefreq": "daily",
//!  "priority": 0.8, "images": [{"loc": "https://www.example.com/a.jpg", "title": "A"}],
//!  "news": {"title": "Launch", "publication": {"name": "Example Times", "language": "en"},
//!           "publication_date": "2024-01-01T09:00:00Z", "keywords": ["space"],
//!           "genres": ["Blog"], "access": "Subscription"}}
//! ```

use serde::Deserialize;
use sitemapgen::{
    ChangeFrequency, Image, NewsAccess, NewsGenre, NewsUrlOptions, Publication, SitemapError,
    SitemapUrl, Url, UrlError, UrlOptions,
};
use sitemapgen_dates::{DateError, W3cDateFormat};

/// Why one input line could not become a sitemap entry.
#[derive(Debug, thiserror::Error)]
pub(crate) enum EntryError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Url(#[from] UrlError),

    #[error("{0}")]
    Date(#[from] DateError),

    #[error("{0}")]
    Sitemap(#[from] SitemapError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryRecord {
    loc: String,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<f64>,
    news: Option<NewsRecord>,
    #[serde(default)]
    images: Vec<ImageRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NewsRecord {
    title: String,
    publication: PublicationRecord,
    publication_date: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    genres: Vec<String>,
    access: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PublicationRecord {
    name: String,
    language: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImageRecord {
    loc: String,
    caption: Option<String>,
    title: Option<String>,
    geo_location: Option<String>,
    license: Option<String>,
}

/// Parse one JSON line into an entry, reading timestamps with `dates`.
pub(crate) fn parse_entry(line: &str, dates: &W3cDateFormat) -> Result<SitemapUrl, EntryError> {
    let record: EntryRecord = serde_json::from_str(line)?;

    let images = record
        .images
        .into_iter()
        .map(ImageRecord::into_image)
        .collect::<Result<Vec<_>, _>>()?;
    let last_modified = record.lastmod.map(|s| dates.parse(&s)).transpose()?;
    let change_frequency = record
        .changefreq
        .map(|s| s.parse::<ChangeFrequency>())
        .transpose()?;

    let Some(news) = record.news else {
        let mut options = UrlOptions::new(&record.loc)?.images(images);
        if let Some(last_modified) = last_modified {
            options = options.last_modified(last_modified);
        }
        if let Some(change_frequency) = change_frequency {
            options = options.change_frequency(change_frequency);
        }
        if let Some(priority) = record.priority {
            options = options.priority(priority);
        }
        return Ok(options.build()?);
    };

    let publication = Publication::new(news.publication.name, &news.publication.language)?;
    let genres = news
        .genres
        .iter()
        .map(|s| s.parse::<NewsGenre>())
        .collect::<Result<Vec<_>, _>>()?;
    let mut options = NewsUrlOptions::new(
        news.title,
        &record.loc,
        publication,
        dates.parse(&news.publication_date)?,
    )?
    .keywords(news.keywords)
    .genres(genres)
    .images(images);
    if let Some(access) = news.access {
        options = options.access(access.parse::<NewsAccess>()?);
    }
    if let Some(last_modified) = last_modified {
        options = options.last_modified(last_modified);
    }
    if let Some(change_frequency) = change_frequency {
        options = options.change_frequency(change_frequency);
    }
    if let Some(priority) = record.priority {
        options = options.priority(priority);
    }
    Ok(options.build()?)
}

impl ImageRecord {
    fn into_image(self) -> Result<Image, UrlError> {
        let mut image = Image::new(&self.loc)?;
        if let Some(caption) = self.caption {
            image = image.caption(caption);
        }
        if let Some(title) = self.title {
            image = image.title(title);
        }
        if let Some(geo_location) = self.geo_location {
            image = image.geo_location(geo_location);
        }
        if let Some(license) = self.license {
            image = image.license(Url::parse(&license)?);
        }
        Ok(image)
    }
}
