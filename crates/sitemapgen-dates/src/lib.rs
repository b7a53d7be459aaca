//! W3C datetime formatting for sitemapgen.
//!
//! Sitemaps carry timestamps in the [W3C Datetime] profile of ISO 8601. The
//! profile allows several levels of precision, from a bare year down to
//! fractions of a second, always with an explicit time zone designator once a
//! time of day is present.
//!
//! [`W3cDateFormat`] renders a point in time at a chosen [`Precision`] in a
//! fixed time zone, and parses any of the profile's forms back.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use sitemapgen_dates::{Precision, W3cDateFormat};
//!
//! let format = W3cDateFormat::new(Precision::Second);
//! let epoch = Utc.timestamp_opt(0, 0).unwrap();
//! assert_eq!(format.format(&epoch), "1970-01-01T00:00:00Z");
//! ```
//!
//! [W3C Datetime]: https://www.w3.org/TR/NOTE-datetime

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Timelike, Utc};

/// Error returned when parsing W3C datetimes or formatter settings.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// Input does not match any W3C datetime pattern.
    #[error("invalid W3C datetime: {0}")]
    Invalid(String),
    /// Unknown precision name.
    #[error("unknown date precision: {0}")]
    UnknownPrecision(String),
    /// Time zone designator is neither `Z` nor `+hh:mm`/`-hh:mm`.
    #[error("invalid time zone designator: {0}")]
    InvalidOffset(String),
}

/// Level of detail for rendered timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// `YYYY`
    Year,
    /// `YYYY-MM`
    Month,
    /// `YYYY-MM-DD`
    Day,
    /// `YYYY-MM-DDThh:mmTZD`
    Minute,
    /// `YYYY-MM-DDThh:mm:ssTZD`
    Second,
    /// `YYYY-MM-DDThh:mm:ss.sssTZD`
    Millisecond,
    /// Shortest of day, minute, second or millisecond that loses no information.
    #[default]
    Auto,
}

impl Precision {
    /// Pick a concrete precision for `local`. Never returns [`Precision::Auto`].
    fn resolve(self, local: &DateTime<FixedOffset>) -> Self {
        if self != Self::Auto {
            return self;
        }
        let millis = (local.nanosecond() / 1_000_000) % 1000;
        if local.hour() == 0 && local.minute() == 0 && local.second() == 0 && millis == 0 {
            Self::Day
        } else if local.second() == 0 && millis == 0 {
            Self::Minute
        } else if millis == 0 {
            Self::Second
        } else {
            Self::Millisecond
        }
    }

    fn has_time(self) -> bool {
        matches!(
            self,
            Self::Minute | Self::Second | Self::Millisecond | Self::Auto
        )
    }
}

impl FromStr for Precision {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "month" => Ok(Self::Month),
            "day" => Ok(Self::Day),
            "minute" => Ok(Self::Minute),
            "second" => Ok(Self::Second),
            "millisecond" => Ok(Self::Millisecond),
            "auto" => Ok(Self::Auto),
            _ => Err(DateError::UnknownPrecision(s.to_owned())),
        }
    }
}

/// Formats and parses W3C datetimes at a fixed precision and time zone.
///
/// A zero offset is labeled `Z`; any other offset as `+hh:mm` or `-hh:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct W3cDateFormat {
    precision: Precision,
    offset: FixedOffset,
}

impl Default for W3cDateFormat {
    fn default() -> Self {
        Self::new(Precision::Auto)
    }
}

impl W3cDateFormat {
    /// Create a formatter rendering in UTC.
    #[must_use]
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            offset: utc_offset(),
        }
    }

    /// Render in the given time zone instead of UTC.
    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Configured precision.
    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Configured time zone offset.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Render `instant` as a W3C datetime string.
    #[must_use]
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        let local = instant.with_timezone(&self.offset);
        let precision = self.precision.resolve(&local);
        let pattern = match precision {
            Precision::Year => "%Y",
            Precision::Month => "%Y-%m",
            Precision::Day => "%Y-%m-%d",
            Precision::Minute => "%Y-%m-%dT%H:%M",
            Precision::Second => "%Y-%m-%dT%H:%M:%S",
            Precision::Millisecond | Precision::Auto => "%Y-%m-%dT%H:%M:%S%.3f",
        };
        let mut out = local.format(pattern).to_string();
        if precision.has_time() {
            out.push_str(&zone_designator(self.offset));
        }
        out
    }

    /// Parse any W3C datetime form.
    ///
    /// Date-only forms (`YYYY`, `YYYY-MM`, `YYYY-MM-DD`) are taken as midnight
    /// in this formatter's time zone.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Invalid`] if `input` matches no pattern.
    pub fn parse(&self, input: &str) -> Result<DateTime<Utc>, DateError> {
        let invalid = || DateError::Invalid(input.to_owned());
        let trimmed = input.trim();

        if trimmed.contains('T') {
            let normalized = match trimmed.strip_suffix('Z') {
                Some(rest) => format!("{rest}+00:00"),
                None => trimmed.to_owned(),
            };
            return ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"]
                .iter()
                .find_map(|pattern| DateTime::parse_from_str(&normalized, pattern).ok())
                .map(|parsed| parsed.with_timezone(&Utc))
                .ok_or_else(invalid);
        }

        let padded = match trimmed.len() {
            4 => format!("{trimmed}-01-01"),
            7 => format!("{trimmed}-01"),
            10 => trimmed.to_owned(),
            _ => return Err(invalid()),
        };
        let date = NaiveDate::parse_from_str(&padded, "%Y-%m-%d").map_err(|_| invalid())?;
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Millisecond => "millisecond",
            Self::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// Parse a time zone designator: `Z`, `+hh:mm` or `-hh:mm`.
///
/// # Errors
///
/// Returns [`DateError::InvalidOffset`] for anything else.
pub fn parse_offset(designator: &str) -> Result<FixedOffset, DateError> {
    let invalid = || DateError::InvalidOffset(designator.to_owned());
    if designator == "Z" {
        return Ok(utc_offset());
    }

    let (sign, rest) = match designator.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

fn zone_designator(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return "Z".to_owned();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}
