//! Resolves the directories and settings for a build. A project is a
//! directory laid out like this:
//!
//! ```text
//! site.yaml            optional; see [`Project`]
//! content/             Markdown sources
//! templates/           page and feed templates
//! static/              copied verbatim into the output directory
//! journal/journal.txt  the link journal
//! public/              output
//! ```

use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::site::FEED_ENTRY_LIMIT;

/// The name of the optional project file in the project root.
pub const PROJECT_FILE: &str = "site.yaml";

/// The timezone used when the project file doesn't name one.
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

// The on-disk project file. Every key is optional.
#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct Project {
    content_directory: PathBuf,
    templates_directory: PathBuf,
    static_directory: PathBuf,
    output_directory: PathBuf,
    journal_file: PathBuf,
    timezone: String,
    feed_entry_limit: usize,
    markdown_mirror: bool,
}

impl Default for Project {
    fn default() -> Project {
        Project {
            content_directory: PathBuf::from("content"),
            templates_directory: PathBuf::from("templates"),
            static_directory: PathBuf::from("static"),
            output_directory: PathBuf::from("public"),
            journal_file: PathBuf::from("journal/journal.txt"),
            timezone: String::from(DEFAULT_TIMEZONE),
            feed_entry_limit: FEED_ENTRY_LIMIT,
            markdown_mirror: true,
        }
    }
}

/// The resolved build settings. Paths are absolute or relative to the
/// current directory, never to the project root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub content_directory: PathBuf,
    pub templates_directory: PathBuf,
    pub static_directory: PathBuf,
    pub output_directory: PathBuf,
    pub journal_file: PathBuf,

    /// An IANA timezone name, e.g. `America/Los_Angeles`.
    pub timezone: String,

    /// The maximum number of items in each feed.
    pub feed_entry_limit: usize,

    /// Whether to write a `.md` copy of each page next to its `.html`.
    pub markdown_mirror: bool,
}

impl Config {
    /// Loads the configuration for the project rooted at `dir`, using the
    /// defaults when there is no project file.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        match path.exists() {
            true => Config::from_project_file(&path),
            false => Ok(Config::resolve(dir, Project::default())),
        }
    }

    /// Loads the configuration from a project file. Relative paths in the
    /// file are resolved against the file's directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Config::resolve(root, project))
    }

    fn resolve(root: &Path, project: Project) -> Config {
        Config {
            content_directory: root.join(project.content_directory),
            templates_directory: root.join(project.templates_directory),
            static_directory: root.join(project.static_directory),
            output_directory: root.join(project.output_directory),
            journal_file: root.join(project.journal_file),
            timezone: project.timezone,
            feed_entry_limit: project.feed_entry_limit,
            markdown_mirror: project.markdown_mirror,
        }
    }
}

/// The result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the project file exists but can't be opened.
    #[error("opening project file `{}`: {err}", .path.display())]
    Open { path: PathBuf, err: io::Error },

    /// Returned when the project file isn't valid.
    #[error("parsing project file `{}`: {err}", .path.display())]
    Parse {
        path: PathBuf,
        err: serde_yaml::Error,
    },
}
