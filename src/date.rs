//! Date handling shared by frontmatter validation, the journal loader, and
//! blog posts. All rendered dates are expressed in a single reference
//! timezone (see [`crate::config::Config::timezone`]) rather than the build
//! host's local zone, so the output doesn't depend on where it's built.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// The frontmatter and journal calendar-date format (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// RFC 1123 with a numeric zone, as used in RSS `pubDate` elements.
pub const RSS_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Resolves an IANA timezone name (e.g., `America/Los_Angeles`).
pub fn timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|e| Error::UnknownTimezone {
        name: name.to_owned(),
        reason: e.to_string(),
    })
}

/// Parses a `YYYY-MM-DD` calendar date. Unlike a bare
/// [`NaiveDate::parse_from_str`], this insists on zero-padded months and days
/// so `2024-1-5` is rejected.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate> {
    let b = s.as_bytes();
    let well_formed = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !well_formed {
        return Err(Error::InvalidDate(s.to_owned()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// Parses a `YYYY-MM-DD` date as midnight in `tz`.
pub fn parse_date(s: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let date = parse_calendar_date(s)?;
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
        .ok_or_else(|| Error::NoLocalMidnight {
            date: s.to_owned(),
            timezone: tz.name().to_owned(),
        })
}

pub fn format_rss(t: &DateTime<Tz>) -> String {
    t.format(RSS_FORMAT).to_string()
}

/// RFC 3339 with second precision; a zero offset is written as `Z`.
pub fn format_atom(t: &DateTime<Tz>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The current instant in Atom format, expressed in `tz`. Used as the feed
/// `updated` value when there's nothing more specific.
pub fn now_atom(tz: &Tz) -> String {
    format_atom(&Utc::now().with_timezone(tz))
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem parsing a date or resolving a timezone.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a date isn't a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date format {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Returned when the configured timezone isn't a known IANA name.
    #[error("loading timezone `{name}`: {reason}")]
    UnknownTimezone { name: String, reason: String },

    /// Returned when midnight doesn't exist on `date` in `timezone` (i.e.,
    /// a DST transition skips it).
    #[error("midnight does not exist on {date} in {timezone}")]
    NoLocalMidnight { date: String, timezone: String },
}
