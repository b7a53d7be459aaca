//! Google image sitemap extension.

use url::Url;

use crate::entry::parse_location;
use crate::error::UrlError;

/// Maximum `<image:image>` blocks per `<url>`.
pub const MAX_IMAGES_PER_URL: usize = 1000;

/// One image attached to a URL entry.
///
/// Rendered as `<image:image>` with `loc`, `caption`, `title`,
/// `geo_location` and `license`, omitting absent fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    loc: Url,
    caption: Option<String>,
    title: Option<String>,
    geo_location: Option<String>,
    license: Option<Url>,
}

impl Image {
    /// Image at `loc`.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::InvalidUrl`] or [`UrlError::UnsupportedScheme`] if
    /// `loc` is not an absolute http(s) URL.
    pub fn new(loc: &str) -> Result<Self, UrlError> {
        Ok(Self {
            loc: parse_location(loc)?,
            caption: None,
            title: None,
            geo_location: None,
            license: None,
        })
    }

    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Free-form location, e.g. `"Limerick, Ireland"`.
    #[must_use]
    pub fn geo_location(mut self, geo_location: impl Into<String>) -> Self {
        self.geo_location = Some(geo_location.into());
        self
    }

    /// URL of the image's license.
    #[must_use]
    pub fn license(mut self, license: Url) -> Self {
        self.license = Some(license);
        self
    }

    #[must_use]
    pub fn loc(&self) -> &Url {
        &self.loc
    }

    #[must_use]
    pub fn caption_text(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    #[must_use]
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn geo_location_text(&self) -> Option<&str> {
        self.geo_location.as_deref()
    }

    #[must_use]
    pub fn license_url(&self) -> Option<&Url> {
        self.license.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_fields() {
        let license = Url::parse("https://creativecommons.org/licenses/by/4.0/").unwrap();
        let image = Image::new("http://www.example.com/cat.jpg")
            .unwrap()
            .caption("A cat")
            .title("Cat")
            .geo_location("Limerick, Ireland")
            .license(license.clone());

        assert_eq!(image.loc().as_str(), "http://www.example.com/cat.jpg");
        assert_eq!(image.caption_text(), Some("A cat"));
        assert_eq!(image.title_text(), Some("Cat"));
        assert_eq!(image.geo_location_text(), Some("Limerick, Ireland"));
        assert_eq!(image.license_url(), Some(&license));
    }

    #[test]
    fn test_image_rejects_bad_url() {
        assert!(matches!(
            Image::new("cat.jpg"),
            Err(UrlError::InvalidUrl(_))
        ));
    }
}
