//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the journal
//! ([`crate::journal`]) and templates ([`crate::template`]), copying the static
//! directory, collecting pages ([`crate::collect`]), and rendering pages and
//! feeds ([`crate::write`]).
//!
//! Collection and rendering are separate passes. Every page can list every
//! blog post, so nothing is rendered until the whole content tree has been
//! walked and [`SiteBuilder::finish`] has sorted the posts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::collect::{self, Collector};
use crate::config::{self, Config};
use crate::date;
use crate::journal;
use crate::site::SiteBuilder;
use crate::template::{self, Templates};
use crate::write::{self, Writer};

/// Counts of what a build produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Rendered pages, not counting drafts.
    pub pages: usize,
    pub blog_posts: usize,
    pub journal_entries: usize,
}

/// Builds the site described by `config`. The journal and templates are
/// loaded before anything is written, so a bad template or journal line
/// leaves the output directory untouched. Errors after that point abort the
/// build and leave partial output in place.
pub fn build_site(config: &Config) -> Result<Summary> {
    let tz = date::timezone(&config.timezone)?;

    log::info!("loading journal `{}`", config.journal_file.display());
    let journal_entries = journal::load(&config.journal_file, &tz)?;

    log::info!("loading templates from `{}`", config.templates_directory.display());
    let templates = Templates::load(&config.templates_directory)?;

    fs::create_dir_all(&config.output_directory).map_err(|err| Error::CreateOutputDirectory {
        path: config.output_directory.clone(),
        err,
    })?;

    log::info!("copying static files from `{}`", config.static_directory.display());
    copy_dir(&config.static_directory, &config.output_directory)?;

    log::info!("collecting pages from `{}`", config.content_directory.display());
    let mut builder =
        SiteBuilder::new(journal_entries, tz).with_feed_entry_limit(config.feed_entry_limit);
    let pages = Collector::new(&config.content_directory, &config.output_directory)
        .collect(&mut builder)?;
    let site = builder.finish();

    log::info!("rendering {} pages", pages.len());
    let writer = Writer {
        templates: &templates,
        site: &site,
        output_directory: &config.output_directory,
        markdown_mirror: config.markdown_mirror,
    };
    writer.write_pages(&pages)?;

    log::info!("rendering feeds");
    writer.write_feeds()?;

    let summary = Summary {
        pages: pages.len(),
        blog_posts: site.blog_posts().len(),
        journal_entries: site.journal_entries().len(),
    };
    log::info!(
        "built {} pages, {} blog posts, {} journal entries into `{}`",
        summary.pages,
        summary.blog_posts,
        summary.journal_entries,
        config.output_directory.display(),
    );
    Ok(summary)
}

// Mirrors the directory tree at `src` into `dst`. `src` must exist.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    let copy_error = |path: &Path, err| Error::CopyStatic {
        path: path.to_owned(),
        err,
    };
    for result in WalkDir::new(src).sort_by_file_name() {
        let entry = result?;
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| copy_error(&target, err))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|err| copy_error(entry.path(), err))?;
        }
    }
    Ok(())
}

/// The result of a build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Wraps the errors of each stage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for configuration errors.
    #[error(transparent)]
    Config(#[from] config::Error),

    /// Returned when the configured timezone is unknown.
    #[error(transparent)]
    Date(#[from] date::Error),

    /// Returned for errors loading the journal.
    #[error(transparent)]
    Journal(#[from] journal::Error),

    /// Returned for errors loading templates.
    #[error(transparent)]
    Template(#[from] template::Error),

    /// Returned for errors collecting pages.
    #[error(transparent)]
    Collect(#[from] collect::Error),

    /// Returned for errors writing pages and feeds.
    #[error(transparent)]
    Write(#[from] write::Error),

    /// Returned when the output directory can't be created.
    #[error("creating output directory `{}`: {err}", .path.display())]
    CreateOutputDirectory { path: PathBuf, err: io::Error },

    /// Returned for I/O problems copying static files.
    #[error("copying static file `{}`: {err}", .path.display())]
    CopyStatic { path: PathBuf, err: io::Error },

    /// Returned for errors walking the static directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
}
