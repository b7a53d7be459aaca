//! Google News sitemap extension.
//!
//! A news entry is a regular [`SitemapUrl`] carrying a [`News`] block with
//! the article's title, [`Publication`] and publication date, plus optional
//! keywords, genres and access level. Build one with [`NewsUrlOptions`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use url::Url;

use crate::entry::{ChangeFrequency, SitemapUrl, UrlOptions};
use crate::error::UrlError;
use crate::image::Image;

/// Publication an article appears in.
///
/// `name` must match the name shown on news.google.com without any trailing
/// parenthetical ("The Example Times", not "The Example Times (subscription)").
/// `language` is an ISO 639 code of two or three letters, or `zh-cn`/`zh-tw`
/// for Simplified/Traditional Chinese.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    name: String,
    language: String,
}

impl Publication {
    /// # Errors
    ///
    /// Returns [`UrlError::MissingField`] for an empty name,
    /// [`UrlError::InvalidPublicationName`] for a trailing parenthetical and
    /// [`UrlError::InvalidLanguage`] for anything that is not a language code.
    pub fn new(name: impl Into<String>, language: &str) -> Result<Self, UrlError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UrlError::MissingField("publication name"));
        }
        if name.trim_end().ends_with(')') {
            return Err(UrlError::InvalidPublicationName(name));
        }

        let language = language.to_ascii_lowercase();
        let valid = matches!(language.as_str(), "zh-cn" | "zh-tw")
            || ((2..=3).contains(&language.len())
                && language.bytes().all(|b| b.is_ascii_lowercase()));
        if !valid {
            return Err(UrlError::InvalidLanguage(language));
        }

        Ok(Self { name, language })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Whether an article is open to all readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsAccess {
    /// Paid membership required.
    Subscription,
    /// Free registration required.
    Registration,
}

impl NewsAccess {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subscription => "Subscription",
            Self::Registration => "Registration",
        }
    }
}

impl fmt::Display for NewsAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsAccess {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Subscription" => Ok(Self::Subscription),
            "Registration" => Ok(Self::Registration),
            _ => Err(UrlError::InvalidAccess(s.to_owned())),
        }
    }
}

/// Content type of a news article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsGenre {
    /// Official press release.
    PressRelease,
    /// Article that ridicules its subject.
    Satire,
    /// Published on a blog or in blog format.
    Blog,
    /// Op-Ed section piece.
    OpEd,
    /// Opinion piece outside the Op-Ed section.
    Opinion,
    /// Written by users, not staff.
    UserGenerated,
}

impl NewsGenre {
    /// Every genre, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::PressRelease,
        Self::Satire,
        Self::Blog,
        Self::OpEd,
        Self::Opinion,
        Self::UserGenerated,
    ];

    /// Canonical name, as rendered in `<news:genres>`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PressRelease => "PressRelease",
            Self::Satire => "Satire",
            Self::Blog => "Blog",
            Self::OpEd => "OpEd",
            Self::Opinion => "Opinion",
            Self::UserGenerated => "UserGenerated",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::PressRelease => "an official press release",
            Self::Satire => "an article which ridicules its subject for didactic purposes",
            Self::Blog => "any article published on a blog, or in a blog format",
            Self::OpEd => {
                "an opinion-based article which comes specifically from the Op-Ed section of your site"
            }
            Self::Opinion => {
                "any other opinion-based article not appearing on an Op-Ed page, i.e., reviews, interviews, etc"
            }
            Self::UserGenerated => {
                "newsworthy user-generated content which has already gone through a formal editorial review process on your site."
            }
        }
    }

    /// Whether Google News shows this genre to readers.
    #[must_use]
    pub fn is_visible(self) -> bool {
        matches!(self, Self::PressRelease | Self::Satire | Self::Blog)
    }

    /// Parse a comma-separated list such as `"Blog, PressRelease"`.
    ///
    /// Order is kept and duplicates are not removed.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::InvalidGenre`] for the first unknown name.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, UrlError> {
        split_list(list).map(str::parse::<Self>).collect()
    }
}

impl fmt::Display for NewsGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsGenre {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|genre| genre.as_str() == name)
            .ok_or_else(|| UrlError::InvalidGenre(s.to_owned()))
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// The `<news:news>` block of an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct News {
    title: String,
    publication: Publication,
    publication_date: DateTime<Utc>,
    keywords: Vec<String>,
    genres: Vec<NewsGenre>,
    access: Option<NewsAccess>,
}

impl News {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn publication(&self) -> &Publication {
        &self.publication
    }

    #[must_use]
    pub fn publication_date(&self) -> DateTime<Utc> {
        self.publication_date
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    #[must_use]
    pub fn genres(&self) -> &[NewsGenre] {
        &self.genres
    }

    #[must_use]
    pub fn access(&self) -> Option<NewsAccess> {
        self.access
    }
}

/// Builder for a Google News entry.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), sitemapgen::UrlError> {
/// use chrono::{TimeZone, Utc};
/// use sitemapgen::{NewsAccess, NewsGenre, NewsUrlOptions, Publication};
///
/// let url = NewsUrlOptions::new(
///     "Crisis Averted",
///     "http://www.example.com/index.html",
///     Publication::new("Fox News", "en")?,
///     Utc.timestamp_opt(0, 0).unwrap(),
/// )?
/// .keywords(["Klaatu", "Barrata", "Nicto"])
/// .access(NewsAccess::Subscription)
/// .genres([NewsGenre::Blog, NewsGenre::PressRelease])
/// .build()?;
///
/// assert_eq!(url.news().unwrap().keywords().len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NewsUrlOptions {
    base: UrlOptions,
    title: String,
    publication: Publication,
    publication_date: DateTime<Utc>,
    keywords: Vec<String>,
    genres: Vec<NewsGenre>,
    access: Option<NewsAccess>,
}

impl NewsUrlOptions {
    /// Start a news entry with its mandatory fields.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::MissingField`] for an empty title, or a URL error if
    /// `loc` is not an absolute http(s) URL.
    pub fn new(
        title: impl Into<String>,
        loc: &str,
        publication: Publication,
        publication_date: DateTime<Utc>,
    ) -> Result<Self, UrlError> {
        Self::with_base(title.into(), UrlOptions::new(loc)?, publication, publication_date)
    }

    /// Like [`NewsUrlOptions::new`] with an already parsed location.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::MissingField`] for an empty title or
    /// [`UrlError::UnsupportedScheme`] for non-http(s) URLs.
    pub fn from_url(
        title: impl Into<String>,
        loc: Url,
        publication: Publication,
        publication_date: DateTime<Utc>,
    ) -> Result<Self, UrlError> {
        Self::with_base(title.into(), UrlOptions::from_url(loc)?, publication, publication_date)
    }

    fn with_base(
        title: String,
        base: UrlOptions,
        publication: Publication,
        publication_date: DateTime<Utc>,
    ) -> Result<Self, UrlError> {
        if title.trim().is_empty() {
            return Err(UrlError::MissingField("title"));
        }
        Ok(Self {
            base,
            title,
            publication,
            publication_date,
            keywords: Vec::new(),
            genres: Vec::new(),
            access: None,
        })
    }

    /// Replace the keywords, keeping their order.
    #[must_use]
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords
            .into_iter()
            .map(Into::<String>::into)
            .map(|keyword| keyword.trim().to_owned())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        self
    }

    /// Replace the keywords from a comma-separated list.
    #[must_use]
    pub fn keyword_list(self, keywords: &str) -> Self {
        let parsed: Vec<&str> = split_list(keywords).collect();
        self.keywords(parsed)
    }

    /// Replace the genres, keeping their order.
    #[must_use]
    pub fn genres(mut self, genres: impl IntoIterator<Item = NewsGenre>) -> Self {
        self.genres = genres.into_iter().collect();
        self
    }

    #[must_use]
    pub fn access(mut self, access: NewsAccess) -> Self {
        self.access = Some(access);
        self
    }

    #[must_use]
    pub fn last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.base = self.base.last_modified(last_modified);
        self
    }

    #[must_use]
    pub fn change_frequency(mut self, change_frequency: ChangeFrequency) -> Self {
        self.base = self.base.change_frequency(change_frequency);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: f64) -> Self {
        self.base = self.base.priority(priority);
        self
    }

    #[must_use]
    pub fn image(mut self, image: Image) -> Self {
        self.base = self.base.image(image);
        self
    }

    #[must_use]
    pub fn images(mut self, images: impl IntoIterator<Item = Image>) -> Self {
        self.base = self.base.images(images);
        self
    }

    /// Freeze into an entry.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`UrlOptions::build`].
    pub fn build(self) -> Result<SitemapUrl, UrlError> {
        let news = News {
            title: self.title,
            publication: self.publication,
            publication_date: self.publication_date,
            keywords: self.keywords,
            genres: self.genres,
            access: self.access,
        };
        self.base.into_entry(Some(news))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    fn fox() -> Publication {
        Publication::new("Fox News", "en").unwrap()
    }

    #[test]
    fn test_required_fields() {
        let url = NewsUrlOptions::new(
            "Crisis Averted",
            "http://www.example.com/index.html",
            fox(),
            epoch(),
        )
        .unwrap()
        .build()
        .unwrap();

        let news = url.news().unwrap();
        assert_eq!(news.title(), "Crisis Averted");
        assert_eq!(news.publication().name(), "Fox News");
        assert_eq!(news.publication().language(), "en");
        assert_eq!(news.publication_date(), epoch());
        assert!(news.keywords().is_empty());
        assert!(news.genres().is_empty());
        assert!(news.access().is_none());
    }

    #[test]
    fn test_empty_title_rejected() {
        let err =
            NewsUrlOptions::new("  ", "http://www.example.com/", fox(), epoch()).unwrap_err();
        assert_eq!(err, UrlError::MissingField("title"));
    }

    #[test]
    fn test_bad_url_rejected() {
        let err = NewsUrlOptions::new("Title", "not a url", fox(), epoch()).unwrap_err();
        assert!(matches!(err, UrlError::InvalidUrl(_)));
    }

    #[test]
    fn test_keyword_forms_converge() {
        let from_list = NewsUrlOptions::new("T", "http://www.example.com/", fox(), epoch())
            .unwrap()
            .keyword_list("Klaatu,Barrata , Nicto,")
            .build()
            .unwrap();
        let from_iter = NewsUrlOptions::new("T", "http://www.example.com/", fox(), epoch())
            .unwrap()
            .keywords(vec!["Klaatu".to_owned(), "Barrata".to_owned(), "Nicto".to_owned()])
            .build()
            .unwrap();

        assert_eq!(from_list, from_iter);
        assert_eq!(
            from_list.news().unwrap().keywords(),
            ["Klaatu", "Barrata", "Nicto"]
        );
    }

    #[test]
    fn test_blank_keywords_dropped() {
        let from_iter = NewsUrlOptions::new("T", "http://www.example.com/", fox(), epoch())
            .unwrap()
            .keywords(["", " Klaatu ", "   "])
            .build()
            .unwrap();
        let from_list = NewsUrlOptions::new("T", "http://www.example.com/", fox(), epoch())
            .unwrap()
            .keyword_list(", Klaatu ,")
            .build()
            .unwrap();

        assert_eq!(from_iter.news().unwrap().keywords(), ["Klaatu"]);
        assert_eq!(from_iter, from_list);
    }

    #[test]
    fn test_base_fields_carried() {
        let url = NewsUrlOptions::new("T", "http://www.example.com/", fox(), epoch())
            .unwrap()
            .priority(0.3)
            .change_frequency(ChangeFrequency::Hourly)
            .build()
            .unwrap();

        assert_eq!(url.priority(), Some(0.3));
        assert_eq!(url.change_frequency(), Some(ChangeFrequency::Hourly));
    }

    #[test]
    fn test_publication_language_codes() {
        assert_eq!(Publication::new("Le Monde", "FR").unwrap().language(), "fr");
        assert_eq!(Publication::new("X", "zh-TW").unwrap().language(), "zh-tw");
        assert!(Publication::new("X", "haw").is_ok());

        for bad in ["e", "engl", "en-us", "e1", ""] {
            assert!(
                matches!(Publication::new("X", bad), Err(UrlError::InvalidLanguage(_))),
                "language {bad:?}"
            );
        }
    }

    #[test]
    fn test_publication_name_rules() {
        assert_eq!(
            Publication::new("", "en").unwrap_err(),
            UrlError::MissingField("publication name")
        );
        assert_eq!(
            Publication::new("The Example Times (subscription)", "en").unwrap_err(),
            UrlError::InvalidPublicationName("The Example Times (subscription)".to_owned())
        );
    }

    #[test]
    fn test_genre_parse_list_keeps_order_and_duplicates() {
        assert_eq!(
            NewsGenre::parse_list("Blog, PressRelease,Blog").unwrap(),
            vec![NewsGenre::Blog, NewsGenre::PressRelease, NewsGenre::Blog]
        );
        assert_eq!(
            NewsGenre::parse_list("Blog, Gossip").unwrap_err(),
            UrlError::InvalidGenre("Gossip".to_owned())
        );
    }

    #[test]
    fn test_genre_visibility() {
        let visible: Vec<_> = NewsGenre::ALL.into_iter().filter(|g| g.is_visible()).collect();
        assert_eq!(
            visible,
            vec![NewsGenre::PressRelease, NewsGenre::Satire, NewsGenre::Blog]
        );
        assert_eq!(NewsGenre::Blog.description(), "any article published on a blog, or in a blog format");
    }

    #[test]
    fn test_access_from_str() {
        assert_eq!(
            "Registration".parse::<NewsAccess>(),
            Ok(NewsAccess::Registration)
        );
        assert_eq!(
            "free".parse::<NewsAccess>(),
            Err(UrlError::InvalidAccess("free".to_owned()))
        );
    }
}
