//! Maps a source file's path (relative to the content directory, with `/`
//! separators) to its category, output file, and URL.

use std::path::PathBuf;

const MARKDOWN_EXTENSION: &str = ".md";
const HTML_EXTENSION: &str = ".html";
const INDEX_FILE: &str = "index.md";
const BLOG_DIRECTORY: &str = "blog/";
const JOURNAL_DIRECTORY: &str = "journal/";

/// The category of a source file, determined entirely by its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// `index.md`
    Home,

    /// Anything under `journal/`.
    Journal,

    /// `blog/index.md`
    BlogIndex,

    /// Anything else under `blog/`. These feed the blog post list.
    BlogPost,

    /// Everything else.
    Page,
}

impl PathKind {
    /// Classifies a content-relative path. The first matching rule wins, so
    /// e.g. `journal/index.md` is [`PathKind::Journal`].
    pub fn classify(relative: &str) -> PathKind {
        if relative == INDEX_FILE {
            PathKind::Home
        } else if relative.starts_with(JOURNAL_DIRECTORY) {
            PathKind::Journal
        } else if relative.strip_prefix(BLOG_DIRECTORY) == Some(INDEX_FILE) {
            PathKind::BlogIndex
        } else if relative.starts_with(BLOG_DIRECTORY) {
            PathKind::BlogPost
        } else {
            PathKind::Page
        }
    }

    /// The name of the template pages of this kind are rendered with, unless
    /// their frontmatter says otherwise.
    pub fn template_name(self) -> &'static str {
        match self {
            PathKind::Home => "home",
            PathKind::Journal => "journal",
            PathKind::BlogIndex => "blog-index",
            PathKind::BlogPost => "blog-post",
            PathKind::Page => "page",
        }
    }
}

/// Where a source file ends up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub kind: PathKind,

    /// The output file, relative to the output directory.
    pub output_path: PathBuf,

    /// The page's URL, rooted at `/` and without an extension.
    pub url: String,

    /// The file name without its extension.
    pub slug: String,
}

impl Route {
    /// Routes a content-relative path such as `blog/hello.md`.
    ///
    /// * `index.md` is written to `index.html` and served at `/`.
    /// * `<dir>/index.md` is written to `<dir>.html` and served at `/<dir>`.
    /// * `<dir>/<name>.md` is written to `<dir>/<name>.html` and served at
    ///   `/<dir>/<name>`.
    pub fn new(relative: &str) -> Route {
        let stem = relative
            .strip_suffix(MARKDOWN_EXTENSION)
            .unwrap_or(relative);
        let slug = match stem.rfind('/') {
            Some(i) => &stem[i + 1..],
            None => stem,
        };

        let (output_path, url) = if relative == INDEX_FILE {
            (String::from("index.html"), String::from("/"))
        } else if let Some(dir) = relative.strip_suffix("/index.md") {
            (format!("{}{}", dir, HTML_EXTENSION), format!("/{}", dir))
        } else {
            (format!("{}{}", stem, HTML_EXTENSION), format!("/{}", stem))
        };

        Route {
            kind: PathKind::classify(relative),
            output_path: output_path.split('/').collect(),
            url,
            slug: slug.to_owned(),
        }
    }
}
