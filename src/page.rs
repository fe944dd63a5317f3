use std::path::PathBuf;

use crate::frontmatter::Frontmatter;
use crate::route::PathKind;

/// The title given to pages whose frontmatter doesn't have one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// A rendered content file. Pages are built during collection and don't
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub description: String,

    /// `YYYY-MM-DD`, or empty.
    pub date: String,

    /// The rendered HTML body.
    pub content: String,

    /// The Markdown body (without frontmatter), for the Markdown mirror.
    pub markdown_source: String,
    pub url: String,
    pub slug: String,

    /// The frontmatter's template override, or empty.
    pub template: String,
    pub draft: bool,
}

impl Page {
    /// The URL of the page's Markdown mirror.
    pub fn markdown_url(&self) -> String {
        match self.url.as_str() {
            "/" => String::from("/index.md"),
            url => format!("{}.md", url),
        }
    }

    /// The subset of the page's metadata that is written back out as
    /// frontmatter in the Markdown mirror.
    pub fn frontmatter(&self) -> Frontmatter {
        fn non_empty(s: &str) -> Option<String> {
            match s.is_empty() {
                true => None,
                false => Some(s.to_owned()),
            }
        }
        Frontmatter {
            title: non_empty(&self.title),
            description: non_empty(&self.description),
            date: non_empty(&self.date),
            template: non_empty(&self.template),
            draft: false,
        }
    }
}

/// A collected [`Page`] and everything needed to render it once the site
/// data is complete.
#[derive(Clone, Debug)]
pub struct PageInfo {
    pub page: Page,

    /// The source file, for error messages.
    pub source: PathBuf,

    /// The output HTML file, including the output directory.
    pub output_path: PathBuf,

    /// The template requested for this page: the frontmatter override if
    /// there is one, otherwise the default for `kind`.
    pub template_name: String,
    pub kind: PathKind,
}

#[cfg(test)]
mod test {
    use super::*;

    fn page(url: &str) -> Page {
        Page {
            title: String::from("T"),
            description: String::new(),
            date: String::from("2024-01-01"),
            content: String::new(),
            markdown_source: String::new(),
            url: url.to_owned(),
            slug: String::new(),
            template: String::new(),
            draft: false,
        }
    }

    #[test]
    fn test_markdown_url() {
        assert_eq!("/index.md", page("/").markdown_url());
        assert_eq!("/about.md", page("/about").markdown_url());
        assert_eq!("/notes/x.md", page("/notes/x").markdown_url());
    }

    #[test]
    fn test_frontmatter_skips_empty_fields() {
        let fm = page("/").frontmatter();
        assert_eq!(Some("T"), fm.title.as_deref());
        assert_eq!(None, fm.description);
        assert_eq!(Some("2024-01-01"), fm.date.as_deref());
        assert_eq!(None, fm.template);
    }
}
