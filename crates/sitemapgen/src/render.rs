//! XML rendering for sitemap documents.
//!
//! Each entry is rendered to a self-contained `<url>` fragment so the
//! generator can measure fragments before assigning them to files. Tag order
//! inside a fragment is fixed:
//!
//! ```text
//! loc, lastmod, changefreq, priority,
//! news:news (publication, access, genres, publication_date, title, keywords),
//! image:image* (loc, caption, title, geo_location, license)
//! ```
//!
//! Absent optional fields produce no tag at all.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use sitemapgen_dates::W3cDateFormat;

use crate::entry::SitemapUrl;
use crate::image::Image;
use crate::news::News;

/// Sitemap protocol namespace, always declared.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
/// Google News extension namespace.
pub const NEWS_NS: &str = "http://www.google.com/schemas/sitemap-news/0.9";
/// Google image extension namespace.
pub const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
pub(crate) const URLSET_CLOSE: &str = "</urlset>";

/// Extension namespaces used by one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Namespaces {
    pub(crate) news: bool,
    pub(crate) image: bool,
}

impl Namespaces {
    /// Every extension namespace, for sizing the largest possible header.
    pub(crate) const ALL: Self = Self {
        news: true,
        image: true,
    };

    pub(crate) fn of(url: &SitemapUrl) -> Self {
        Self {
            news: url.news().is_some(),
            image: !url.images().is_empty(),
        }
    }

    pub(crate) fn union(self, other: Self) -> Self {
        Self {
            news: self.news || other.news,
            image: self.image || other.image,
        }
    }
}

/// XML declaration and `<urlset>` start tag.
pub(crate) fn urlset_open(namespaces: Namespaces) -> String {
    let mut out = String::from(XML_DECLARATION);
    write!(out, "<urlset xmlns=\"{SITEMAP_NS}\"").ok();
    if namespaces.news {
        write!(out, " xmlns:news=\"{NEWS_NS}\"").ok();
    }
    if namespaces.image {
        write!(out, " xmlns:image=\"{IMAGE_NS}\"").ok();
    }
    out.push_str(" >\n");
    out
}

/// Render one `<url>` element, two-space indented, ending with a newline.
pub(crate) fn render_url(url: &SitemapUrl, dates: &W3cDateFormat) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("  <url>\n");
    element(&mut out, 4, "loc", url.loc().as_str());
    if let Some(last_modified) = url.last_modified() {
        element(&mut out, 4, "lastmod", &dates.format(&last_modified));
    }
    if let Some(change_frequency) = url.change_frequency() {
        element(&mut out, 4, "changefreq", change_frequency.as_str());
    }
    if let Some(priority) = url.priority() {
        element(&mut out, 4, "priority", &format!("{priority:.1}"));
    }
    if let Some(news) = url.news() {
        render_news(&mut out, news, dates);
    }
    for image in url.images() {
        render_image(&mut out, image);
    }
    out.push_str("  </url>\n");
    out
}

fn render_news(out: &mut String, news: &News, dates: &W3cDateFormat) {
    out.push_str("    <news:news>\n");
    out.push_str("      <news:publication>\n");
    element(out, 8, "news:name", news.publication().name());
    element(out, 8, "news:language", news.publication().language());
    out.push_str("      </news:publication>\n");
    if let Some(access) = news.access() {
        element(out, 6, "news:access", access.as_str());
    }
    if !news.genres().is_empty() {
        let genres = join_list(news.genres().iter().map(|g| g.as_str()));
        element(out, 6, "news:genres", &genres);
    }
    element(
        out,
        6,
        "news:publication_date",
        &dates.format(&news.publication_date()),
    );
    element(out, 6, "news:title", news.title());
    if !news.keywords().is_empty() {
        let keywords = join_list(news.keywords().iter().map(String::as_str));
        element(out, 6, "news:keywords", &keywords);
    }
    out.push_str("    </news:news>\n");
}

fn render_image(out: &mut String, image: &Image) {
    out.push_str("    <image:image>\n");
    element(out, 6, "image:loc", image.loc().as_str());
    if let Some(caption) = image.caption_text() {
        element(out, 6, "image:caption", caption);
    }
    if let Some(title) = image.title_text() {
        element(out, 6, "image:title", title);
    }
    if let Some(geo_location) = image.geo_location_text() {
        element(out, 6, "image:geo_location", geo_location);
    }
    if let Some(license) = image.license_url() {
        element(out, 6, "image:license", license.as_str());
    }
    out.push_str("    </image:image>\n");
}

/// Join list values with `", "`, keeping caller order.
pub(crate) fn join_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items.into_iter().collect::<Vec<_>>().join(", ")
}

/// One sitemap reference inside a `<sitemapindex>`.
pub(crate) struct IndexItem<'a> {
    pub(crate) loc: &'a str,
    pub(crate) last_modified: Option<DateTime<Utc>>,
}

/// Render a complete `<sitemapindex>` document.
pub(crate) fn render_index<'a>(
    items: impl IntoIterator<Item = IndexItem<'a>>,
    dates: &W3cDateFormat,
) -> String {
    let mut out = String::from(XML_DECLARATION);
    writeln!(out, "<sitemapindex xmlns=\"{SITEMAP_NS}\">").ok();
    for item in items {
        out.push_str("  <sitemap>\n");
        element(&mut out, 4, "loc", item.loc);
        if let Some(last_modified) = item.last_modified {
            element(&mut out, 4, "lastmod", &dates.format(&last_modified));
        }
        out.push_str("  </sitemap>\n");
    }
    out.push_str("</sitemapindex>");
    out
}

fn element(out: &mut String, indent: usize, tag: &str, text: &str) {
    writeln!(out, "{:indent$}<{tag}>{}</{tag}>", "", escape(text)).ok();
}
