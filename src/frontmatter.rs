//! Splits a source file into its YAML frontmatter and its Markdown body, and
//! writes frontmatter back out for the Markdown mirror of a page.
//!
//! A file with frontmatter looks like this:
//!
//! ```md
//! ---
//! title: Hello, world!
//! date: 2021-04-16
//! ---
//! # Hello
//!
//! World
//! ```
//!
//! Frontmatter is optional. A file that doesn't start with a `---` line, or
//! whose opening fence is never closed, is all body.

use serde::Deserialize;
use std::fmt::Write;

use crate::date;

const OPEN_FENCE: &str = "---\n";
const CLOSE_FENCE: &str = "\n---\n";
const TRAILING_FENCE: &str = "\n---";

/// The metadata a source file may declare. Unknown keys are ignored.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,

    /// `YYYY-MM-DD`; validated by [`extract`].
    pub date: Option<String>,

    /// Overrides the template chosen by [`crate::route::PathKind`].
    pub template: Option<String>,

    /// Drafts are excluded from all output.
    pub draft: bool,
}

impl Frontmatter {
    // `title: ""` means the same thing as no title at all.
    fn normalize(mut self) -> Self {
        fn non_empty(field: &mut Option<String>) {
            if field.as_deref() == Some("") {
                *field = None;
            }
        }
        non_empty(&mut self.title);
        non_empty(&mut self.description);
        non_empty(&mut self.date);
        non_empty(&mut self.template);
        self
    }
}

/// Splits `input` into its [`Frontmatter`] and body. Returns the default
/// frontmatter and the whole input when there is no (closed) frontmatter
/// block.
pub fn extract(input: &str) -> Result<(Frontmatter, &str)> {
    let (block, body) = match split(input) {
        Some(parts) => parts,
        None => return Ok((Frontmatter::default(), input)),
    };

    if block.trim().is_empty() {
        return Ok((Frontmatter::default(), body));
    }

    let frontmatter = serde_yaml::from_str::<Frontmatter>(block)?.normalize();
    if let Some(d) = &frontmatter.date {
        date::parse_calendar_date(d)?;
    }
    Ok((frontmatter, body))
}

// Returns the YAML block and the body, or `None` if `input` doesn't have a
// complete frontmatter block.
fn split(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix(OPEN_FENCE)?;
    match rest.find(CLOSE_FENCE) {
        Some(i) => Some((&rest[..i], &rest[i + CLOSE_FENCE.len()..])),
        None => rest.strip_suffix(TRAILING_FENCE).map(|block| (block, "")),
    }
}

/// Writes `frontmatter` as a fenced YAML block followed by a blank line.
/// Only `title`, `description`, `date`, and `template` are written; nothing
/// is written if none of them is set.
pub fn write(out: &mut String, frontmatter: &Frontmatter) {
    let fields = [
        ("title", &frontmatter.title),
        ("description", &frontmatter.description),
        ("date", &frontmatter.date),
        ("template", &frontmatter.template),
    ];
    if fields.iter().all(|(_, value)| value.is_none()) {
        return;
    }

    out.push_str(OPEN_FENCE);
    for (key, value) in fields.iter() {
        if let Some(value) = value {
            // Writing into a `String` can't fail.
            let _ = writeln!(out, "{}: {}", key, yaml_scalar(value));
        }
    }
    out.push_str("---\n\n");
}

/// Renders `s` as a YAML scalar, quoted or block-formatted as needed for it
/// to read back as the same string.
fn yaml_scalar(s: &str) -> String {
    match serde_yaml::to_string(s) {
        Ok(yaml) => yaml.trim_end().to_owned(),
        Err(_) => format!("{:?}", s),
    }
}

/// Represents the result of a frontmatter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error extracting frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the frontmatter block isn't valid YAML, or doesn't
    /// match the shape of [`Frontmatter`].
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Returned when the `date` field isn't a valid `YYYY-MM-DD` date.
    #[error(transparent)]
    InvalidDate(#[from] date::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_extract_without_frontmatter() -> Result<()> {
        for input in &[
            "",
            "# Hello\n\nWorld\n",
            "--- not a fence\ntitle: x\n---\n",
            " ---\ntitle: x\n---\n",
        ] {
            let (frontmatter, body) = extract(input)?;
            assert_eq!(Frontmatter::default(), frontmatter);
            assert_eq!(*input, body);
        }
        Ok(())
    }

    #[test]
    fn test_extract() -> Result<()> {
        let (frontmatter, body) = extract(
            "---\ntitle: Hello\ndescription: A greeting\ndate: 2024-01-01\n---\n# Hello\n",
        )?;
        assert_eq!(
            Frontmatter {
                title: Some("Hello".to_owned()),
                description: Some("A greeting".to_owned()),
                date: Some("2024-01-01".to_owned()),
                template: None,
                draft: false,
            },
            frontmatter
        );
        assert_eq!("# Hello\n", body);
        Ok(())
    }

    #[test]
    fn test_extract_trailing_fence_at_eof() -> Result<()> {
        let (frontmatter, body) = extract("---\ntitle: Only metadata\n---")?;
        assert_eq!(Some("Only metadata"), frontmatter.title.as_deref());
        assert_eq!("", body);
        Ok(())
    }

    #[test]
    fn test_extract_unclosed_fence_is_body() -> Result<()> {
        let input = "---\ntitle: Never closed\n\n# Body\n";
        let (frontmatter, body) = extract(input)?;
        assert_eq!(Frontmatter::default(), frontmatter);
        assert_eq!(input, body);
        Ok(())
    }

    #[test]
    fn test_extract_ignores_unknown_keys() -> Result<()> {
        let (frontmatter, _) =
            extract("---\ntitle: Tagged\ntags: [a, b]\nauthor: me\ndraft: true\n---\n")?;
        assert_eq!(Some("Tagged"), frontmatter.title.as_deref());
        assert!(frontmatter.draft);
        Ok(())
    }

    #[test]
    fn test_extract_empty_block() -> Result<()> {
        let (frontmatter, body) = extract("---\n\n---\nbody")?;
        assert_eq!(Frontmatter::default(), frontmatter);
        assert_eq!("body", body);
        Ok(())
    }

    #[test]
    fn test_extract_malformed_yaml() {
        assert!(matches!(
            extract("---\ntitle: [unterminated\n---\nbody"),
            Err(Error::Yaml(_))
        ));
        assert!(matches!(
            extract("---\njust a scalar\n---\nbody"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_extract_invalid_date() {
        match extract("---\ndate: 2024-13-01\n---\n") {
            Err(Error::InvalidDate(err)) => {
                assert!(err.to_string().contains("2024-13-01"))
            }
            other => panic!("wanted InvalidDate; found {:?}", other),
        }
    }

    #[test]
    fn test_write_round_trip() -> Result<()> {
        let wanted = Frontmatter {
            title: Some("Colons: quotes \" and 'apostrophes'".to_owned()),
            description: Some("two\nlines".to_owned()),
            date: Some("2024-02-01".to_owned()),
            template: Some("true".to_owned()),
            draft: false,
        };
        let mut out = String::new();
        write(&mut out, &wanted);
        out.push_str("# Body\n");

        let (found, body) = extract(&out)?;
        assert_eq!(wanted, found);
        assert_eq!("\n# Body\n", body);
        Ok(())
    }

    #[test]
    fn test_write_nothing_when_empty() {
        let mut out = String::new();
        write(&mut out, &Frontmatter::default());
        assert_eq!("", out);
    }
}
