//! Pass one of the build: walks the content directory, renders every
//! Markdown file, and records blog posts in the [`SiteBuilder`]. Nothing is
//! written to disk here; the returned [`PageInfo`]s are rendered by
//! [`crate::write::Writer`] once the site data is complete.

use chrono_tz::Tz;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::date;
use crate::frontmatter::{self, Frontmatter};
use crate::markdown;
use crate::page::{Page, PageInfo, DEFAULT_TITLE};
use crate::route::{PathKind, Route};
use crate::site::{BlogPost, SiteBuilder};

const MARKDOWN_EXTENSION: &str = "md";

/// Collects [`Page`]s from the content directory.
pub struct Collector<'a> {
    /// The root of the content tree. Routing is relative to this directory.
    content_directory: &'a Path,

    /// The directory in which pages will be rendered.
    output_directory: &'a Path,
}

impl<'a> Collector<'a> {
    pub fn new(content_directory: &'a Path, output_directory: &'a Path) -> Collector<'a> {
        Collector {
            content_directory,
            output_directory,
        }
    }

    /// Walks the content directory in file name order and collects every
    /// non-draft Markdown file. Blog posts are pushed onto `site` as they are
    /// found; they are not sorted.
    pub fn collect(&self, site: &mut SiteBuilder) -> Result<Vec<PageInfo>> {
        let mut pages = Vec::new();
        for result in WalkDir::new(self.content_directory).sort_by_file_name() {
            let entry = result?;
            if !entry.file_type().is_file()
                || entry.path().extension().map_or(true, |ext| ext != MARKDOWN_EXTENSION)
            {
                continue;
            }

            match self.collect_page(entry.path(), site) {
                Ok(Some(info)) => pages.push(info),
                Ok(None) => log::debug!("skipping draft `{}`", entry.path().display()),
                Err(e) => {
                    return Err(Error::Annotated(
                        format!("collecting `{}`", entry.path().display()),
                        Box::new(e),
                    ))
                }
            }
        }
        Ok(pages)
    }

    /// Collects a single source file. Returns `None` for drafts.
    fn collect_page(&self, path: &Path, site: &mut SiteBuilder) -> Result<Option<PageInfo>> {
        let contents = fs::read_to_string(path)?;
        let (frontmatter, body) = frontmatter::extract(&contents)?;
        if frontmatter.draft {
            return Ok(None);
        }

        let relative = self.relative_path(path)?;
        let route = Route::new(&relative);
        let template_name = match &frontmatter.template {
            Some(template) => template.clone(),
            None => route.kind.template_name().to_owned(),
        };
        let page = build_page(frontmatter, body, &route);

        if route.kind == PathKind::BlogPost {
            let post = blog_post(&page, site.timezone())?;
            site.push_blog_post(post);
        }

        Ok(Some(PageInfo {
            page,
            source: path.to_owned(),
            output_path: self.output_directory.join(&route.output_path),
            template_name,
            kind: route.kind,
        }))
    }

    // The path of `path` relative to the content directory, with `/`
    // separators regardless of platform.
    fn relative_path(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(self.content_directory)
            .map_err(|_| Error::InvalidFileName(path.to_owned()))?;
        let components = relative
            .iter()
            .map(|c| c.to_str().ok_or_else(|| Error::InvalidFileName(path.to_owned())))
            .collect::<Result<Vec<&str>>>()?;
        Ok(components.join("/"))
    }
}

fn build_page(frontmatter: Frontmatter, body: &str, route: &Route) -> Page {
    let title = match (frontmatter.title, route.kind) {
        (Some(title), _) => title,
        (None, PathKind::BlogPost) => route.slug.replace('-', " "),
        (None, _) => String::from(DEFAULT_TITLE),
    };
    Page {
        title,
        description: frontmatter.description.unwrap_or_default(),
        date: frontmatter.date.unwrap_or_default(),
        content: markdown::to_html(body),
        markdown_source: body.to_owned(),
        url: route.url.clone(),
        slug: route.slug.clone(),
        template: frontmatter.template.unwrap_or_default(),
        draft: frontmatter.draft,
    }
}

fn blog_post(page: &Page, tz: &Tz) -> Result<BlogPost> {
    let (date_rss, date_atom) = match page.date.is_empty() {
        true => (String::new(), String::new()),
        false => {
            let t = date::parse_date(&page.date, tz)?;
            (date::format_rss(&t), date::format_atom(&t))
        }
    };
    Ok(BlogPost {
        title: page.title.clone(),
        slug: page.slug.clone(),
        date: page.date.clone(),
        date_rss,
        date_atom,
        content: page.content.clone(),
    })
}

/// Represents the result of a collection operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error collecting pages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a source file has invalid frontmatter.
    #[error(transparent)]
    Frontmatter(#[from] frontmatter::Error),

    /// Returned when a blog post's date can't be resolved.
    #[error(transparent)]
    Date(#[from] date::Error),

    /// Returned when a source path isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned for I/O errors reading source files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for errors walking the content directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}
