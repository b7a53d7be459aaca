//! Web sitemap entries and their builder.
//!
//! [`UrlOptions`] collects the fields for one `<url>` element and freezes
//! them into an immutable [`SitemapUrl`] via [`UrlOptions::build`]. Extension
//! builders (news) wrap a `UrlOptions` and produce the same entry type.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::UrlError;
use crate::image::{Image, MAX_IMAGES_PER_URL};
use crate::news::News;

/// How frequently the page is likely to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    /// Changes on every access.
    Always,
    /// About once an hour.
    Hourly,
    /// About once a day.
    Daily,
    /// About once a week.
    Weekly,
    /// About once a month.
    Monthly,
    /// About once a year.
    Yearly,
    /// Archived content that will not change.
    Never,
}

impl ChangeFrequency {
    /// Protocol name, as rendered in `<changefreq>`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeFrequency {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(UrlError::InvalidChangeFrequency(s.to_owned())),
        }
    }
}

/// Parse an absolute http(s) URL.
pub(crate) fn parse_location(loc: &str) -> Result<Url, UrlError> {
    let url = Url::parse(loc)?;
    check_scheme(&url)?;
    Ok(url)
}

fn check_scheme(url: &Url) -> Result<(), UrlError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(UrlError::UnsupportedScheme(other.to_owned())),
    }
}

/// Normalize a base URL so its path reads as a directory.
///
/// `http://example.com/blog` and `http://example.com/blog/` both become the
/// latter, which makes [`Url::join`] resolve file names beneath it.
pub(crate) fn normalize_base(base: &str) -> Result<Url, UrlError> {
    let mut url = parse_location(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Check that `loc` is a path descendant of the normalized `base`.
pub(crate) fn check_within(loc: &Url, base: &Url) -> Result<(), UrlError> {
    let same_origin = loc.scheme() == base.scheme()
        && loc.host_str() == base.host_str()
        && loc.port_or_known_default() == base.port_or_known_default();
    let base_path = base.path();
    let in_path = loc.path().starts_with(base_path)
        || loc.path() == base_path.trim_end_matches('/');

    if same_origin && in_path {
        Ok(())
    } else {
        Err(UrlError::OutsideBase {
            url: loc.to_string(),
            base: base.to_string(),
        })
    }
}

/// One `<url>` entry, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    loc: Url,
    last_modified: Option<DateTime<Utc>>,
    change_frequency: Option<ChangeFrequency>,
    priority: Option<f64>,
    news: Option<News>,
    images: Vec<Image>,
}

impl SitemapUrl {
    /// Page location.
    #[must_use]
    pub fn loc(&self) -> &Url {
        &self.loc
    }

    #[must_use]
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    #[must_use]
    pub fn change_frequency(&self) -> Option<ChangeFrequency> {
        self.change_frequency
    }

    #[must_use]
    pub fn priority(&self) -> Option<f64> {
        self.priority
    }

    /// Google News block, if this is a news entry.
    #[must_use]
    pub fn news(&self) -> Option<&News> {
        self.news.as_ref()
    }

    /// Attached images, in the order they were added.
    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Latest of `lastmod` and the news publication date, if either is set.
    #[must_use]
    pub fn latest_date(&self) -> Option<DateTime<Utc>> {
        let published = self.news.as_ref().map(News::publication_date);
        self.last_modified.max(published)
    }
}

/// Builder for one web sitemap entry.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), sitemapgen::UrlError> {
/// use sitemapgen::{ChangeFrequency, UrlOptions};
///
/// let url = UrlOptions::new("https://www.example.com/about")?
///     .change_frequency(ChangeFrequency::Monthly)
///     .priority(0.8)
///     .build()?;
/// assert_eq!(url.priority(), Some(0.8));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UrlOptions {
    loc: Url,
    last_modified: Option<DateTime<Utc>>,
    change_frequency: Option<ChangeFrequency>,
    priority: Option<f64>,
    images: Vec<Image>,
}

impl UrlOptions {
    /// Start an entry for `loc`.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::InvalidUrl`] or [`UrlError::UnsupportedScheme`] if
    /// `loc` is not an absolute http(s) URL.
    pub fn new(loc: &str) -> Result<Self, UrlError> {
        parse_location(loc).and_then(Self::from_url)
    }

    /// Start an entry for an already parsed location.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::UnsupportedScheme`] for non-http(s) URLs.
    pub fn from_url(loc: Url) -> Result<Self, UrlError> {
        check_scheme(&loc)?;
        Ok(Self {
            loc,
            last_modified: None,
            change_frequency: None,
            priority: None,
            images: Vec::new(),
        })
    }

    #[must_use]
    pub fn last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    #[must_use]
    pub fn change_frequency(mut self, change_frequency: ChangeFrequency) -> Self {
        self.change_frequency = Some(change_frequency);
        self
    }

    /// Relative priority in `0.0..=1.0`, checked by [`UrlOptions::build`].
    #[must_use]
    pub fn priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attach one image.
    #[must_use]
    pub fn image(mut self, image: Image) -> Self {
        self.images.push(image);
        self
    }

    /// Attach several images, keeping their order.
    #[must_use]
    pub fn images(mut self, images: impl IntoIterator<Item = Image>) -> Self {
        self.images.extend(images);
        self
    }

    /// Freeze into an entry.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::PriorityOutOfRange`] or [`UrlError::TooManyImages`].
    pub fn build(self) -> Result<SitemapUrl, UrlError> {
        self.into_entry(None)
    }

    pub(crate) fn into_entry(self, news: Option<News>) -> Result<SitemapUrl, UrlError> {
        if let Some(priority) = self.priority
            && !(0.0..=1.0).contains(&priority)
        {
            return Err(UrlError::PriorityOutOfRange(priority));
        }
        if self.images.len() > MAX_IMAGES_PER_URL {
            return Err(UrlError::TooManyImages {
                count: self.images.len(),
                max: MAX_IMAGES_PER_URL,
            });
        }

        Ok(SitemapUrl {
            loc: self.loc,
            last_modified: self.last_modified,
            change_frequency: self.change_frequency,
            priority: self.priority,
            news,
            images: self.images,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_build_minimal() {
        let url = UrlOptions::new("http://www.example.com/index.html")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(url.loc().as_str(), "http://www.example.com/index.html");
        assert!(url.last_modified().is_none());
        assert!(url.change_frequency().is_none());
        assert!(url.priority().is_none());
        assert!(url.news().is_none());
        assert!(url.images().is_empty());
    }

    #[test]
    fn test_build_all_fields() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let url = UrlOptions::new("https://www.example.com/a")
            .unwrap()
            .priority(1.0)
            .change_frequency(ChangeFrequency::Weekly)
            .last_modified(date)
            .build()
            .unwrap();

        assert_eq!(url.last_modified(), Some(date));
        assert_eq!(url.change_frequency(), Some(ChangeFrequency::Weekly));
        assert_eq!(url.priority(), Some(1.0));
    }

    #[test]
    fn test_latest_date_includes_publication_date() {
        use crate::news::{NewsUrlOptions, Publication};

        let modified = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let publication = Publication::new("Example Times", "en").unwrap();
        let news = NewsUrlOptions::new("T", "https://www.example.com/a", publication, published)
            .unwrap()
            .last_modified(modified)
            .build()
            .unwrap();
        let web = UrlOptions::new("https://www.example.com/b")
            .unwrap()
            .last_modified(modified)
            .build()
            .unwrap();

        assert_eq!(news.latest_date(), Some(published));
        assert_eq!(web.latest_date(), Some(modified));
        assert_eq!(
            UrlOptions::new("https://www.example.com/c")
                .unwrap()
                .build()
                .unwrap()
                .latest_date(),
            None
        );
    }

    #[test]
    fn test_rejects_relative_url() {
        let err = UrlOptions::new("/index.html").unwrap_err();
        assert_eq!(
            err,
            UrlError::InvalidUrl(url::ParseError::RelativeUrlWithoutBase)
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = UrlOptions::new("ftp://www.example.com/file").unwrap_err();
        assert_eq!(err, UrlError::UnsupportedScheme("ftp".to_owned()));
    }

    #[test]
    fn test_priority_range_checked_at_build() {
        for bad in [-0.1, 1.5, f64::NAN] {
            let result = UrlOptions::new("http://www.example.com/")
                .unwrap()
                .priority(bad)
                .build();
            assert!(
                matches!(result, Err(UrlError::PriorityOutOfRange(_))),
                "priority {bad}"
            );
        }
    }

    #[test]
    fn test_too_many_images() {
        let image = Image::new("http://www.example.com/a.png").unwrap();
        let result = UrlOptions::new("http://www.example.com/")
            .unwrap()
            .images(std::iter::repeat_n(image, MAX_IMAGES_PER_URL + 1))
            .build();

        assert_eq!(
            result.unwrap_err(),
            UrlError::TooManyImages {
                count: MAX_IMAGES_PER_URL + 1,
                max: MAX_IMAGES_PER_URL,
            }
        );
    }

    #[test]
    fn test_change_frequency_from_str() {
        assert_eq!("daily".parse::<ChangeFrequency>(), Ok(ChangeFrequency::Daily));
        assert_eq!("NEVER".parse::<ChangeFrequency>(), Ok(ChangeFrequency::Never));
        assert_eq!(
            "sometimes".parse::<ChangeFrequency>(),
            Err(UrlError::InvalidChangeFrequency("sometimes".to_owned()))
        );
    }

    #[test]
    fn test_normalize_base_adds_trailing_slash() {
        let base = normalize_base("http://www.example.com/blog?x=1").unwrap();
        assert_eq!(base.as_str(), "http://www.example.com/blog/");

        let root = normalize_base("http://www.example.com").unwrap();
        assert_eq!(root.as_str(), "http://www.example.com/");
    }

    #[test]
    fn test_check_within() {
        let base = normalize_base("http://www.example.com/blog").unwrap();
        let inside = |s: &str| check_within(&Url::parse(s).unwrap(), &base).is_ok();

        assert!(inside("http://www.example.com/blog"));
        assert!(inside("http://www.example.com/blog/"));
        assert!(inside("http://www.example.com/blog/post?id=1"));
        assert!(inside("http://www.example.com:80/blog/post"));
        assert!(!inside("http://www.example.com/blogger"));
        assert!(!inside("http://www.example.com/"));
        assert!(!inside("https://www.example.com/blog/post"));
        assert!(!inside("http://example.com/blog/post"));
        assert!(!inside("http://www.example.com:8080/blog/post"));
    }
}
