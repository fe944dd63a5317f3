//! Loads the journal: a flat log of links, one per line, each prefixed with
//! the Unix timestamp at which it was recorded:
//!
//! ```text
//! 1700000000 https://example.com/post
//! 1700003600 https://example.org/another
//! ```

use chrono::TimeZone;
use chrono_tz::Tz;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::date;

/// A single journal line, with its timestamp pre-formatted for the page and
/// feed templates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalEntry {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,

    /// `YYYY-MM-DD` in the reference timezone.
    pub date: String,
    pub date_rss: String,
    pub date_atom: String,
    pub url: String,
}

impl JournalEntry {
    fn new(timestamp: i64, url: &str, tz: &Tz) -> Option<JournalEntry> {
        let t = tz.timestamp_opt(timestamp, 0).single()?;
        Some(JournalEntry {
            timestamp,
            date: t.format(date::DATE_FORMAT).to_string(),
            date_rss: date::format_rss(&t),
            date_atom: date::format_atom(&t),
            url: url.to_owned(),
        })
    }
}

/// Opens and parses the journal file at `path`. See [`parse`].
pub fn load(path: &Path, tz: &Tz) -> Result<Vec<JournalEntry>> {
    let file = File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })?;
    parse(BufReader::new(file), tz)
}

/// Parses journal lines from `reader`, returning the entries newest first.
/// Entries with the same timestamp keep their order from the log. Blank
/// lines are skipped, but a line of only whitespace is malformed. Fields
/// after the URL are ignored.
pub fn parse<R: BufRead>(reader: R, tz: &Tz) -> Result<Vec<JournalEntry>> {
    let mut entries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (timestamp, url) = match (fields.next(), fields.next()) {
            (Some(timestamp), Some(url)) => (timestamp, url),
            _ => {
                return Err(Error::Malformed {
                    line_number: i + 1,
                    line: line.clone(),
                })
            }
        };

        let timestamp: i64 = timestamp.parse().map_err(|_| Error::Timestamp {
            line_number: i + 1,
            value: timestamp.to_owned(),
        })?;
        entries.push(
            JournalEntry::new(timestamp, url, tz).ok_or(Error::OutOfRange {
                line_number: i + 1,
                timestamp,
            })?,
        );
    }

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(entries)
}

/// Represents the result of loading the journal.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the journal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the journal file can't be opened.
    #[error("opening journal `{}`: {err}", .path.display())]
    Open { path: PathBuf, err: io::Error },

    /// Returned for I/O errors while reading the journal.
    #[error("reading journal: {0}")]
    Io(#[from] io::Error),

    /// Returned when a line doesn't have both a timestamp and a URL.
    #[error(
        "malformed journal entry on line {line_number}, expected '<timestamp> <url>', got: {line:?}"
    )]
    Malformed { line_number: usize, line: String },

    /// Returned when the first field of a line isn't an integer.
    #[error("parsing timestamp {value:?} on line {line_number}")]
    Timestamp { line_number: usize, value: String },

    /// Returned when a timestamp can't be represented as a date.
    #[error("timestamp {timestamp} on line {line_number} is out of range")]
    OutOfRange { line_number: usize, timestamp: i64 },
}
