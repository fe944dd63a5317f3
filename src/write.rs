//! Pass two of the build: renders collected pages, their Markdown mirrors,
//! and the site feeds against a finished [`Site`].

use gtmpl_value::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::frontmatter;
use crate::page::{Page, PageInfo};
use crate::route::PathKind;
use crate::site::Site;
use crate::template::{self, Render, Templates, DEFAULT_PAGE_TEMPLATE};
use crate::value::page_data;

/// Responsible for templating and writing pages and feeds to disk.
pub struct Writer<'a> {
    /// The parsed page and feed templates.
    pub templates: &'a Templates,

    /// The sorted site data. Every page and feed sees the same [`Site`].
    pub site: &'a Site,

    /// The directory in which feeds are written. Page output paths already
    /// include it.
    pub output_directory: &'a Path,

    /// Whether to write a `.md` copy next to each `.html` page.
    pub markdown_mirror: bool,
}

impl Writer<'_> {
    /// Renders every page in `pages` and, if enabled, its Markdown mirror.
    pub fn write_pages(&self, pages: &[PageInfo]) -> Result<()> {
        let site = Value::from(self.site);
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for info in pages {
            if let Some(dir) = info.output_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    fs::create_dir_all(dir).map_err(|err| Error::CreateDirectory {
                        path: dir.to_owned(),
                        err,
                    })?;
                }
            }
            self.write_page(info, &site).map_err(|e| {
                Error::Annotated(format!("rendering `{}`", info.source.display()), Box::new(e))
            })?;
            log::debug!("wrote `{}`", info.output_path.display());
        }
        Ok(())
    }

    fn write_page(&self, info: &PageInfo, site: &Value) -> Result<()> {
        let template = self.page_template(info)?;
        render_to_file(template, &info.output_path, &page_data(&info.page, site))?;
        if self.markdown_mirror {
            let path = info.output_path.with_extension("md");
            fs::write(&path, self.mirror(info)).map_err(|err| Error::WriteFile { path, err })?;
        }
        Ok(())
    }

    // A page with no usable template falls back to the default page
    // template, unless the page asked for that template explicitly.
    fn page_template(&self, info: &PageInfo) -> Result<&template::PageTemplate> {
        if let Some(template) = self.templates.page(&info.template_name) {
            return Ok(template);
        }
        if !info.page.template.is_empty() {
            return Err(Error::TemplateNotFound(info.template_name.clone()));
        }
        self.templates
            .page(DEFAULT_PAGE_TEMPLATE)
            .ok_or_else(|| Error::TemplateNotFound(DEFAULT_PAGE_TEMPLATE.to_owned()))
    }

    /// The Markdown mirror of a page. Journal and blog index pages list the
    /// site's entries; other pages reproduce their source.
    fn mirror(&self, info: &PageInfo) -> String {
        let mut out = String::new();
        match info.kind {
            PathKind::Journal => {
                frontmatter::write(&mut out, &listing_frontmatter(&info.page));
                out.push_str("# journal\n\n");
                for entry in self.site.journal_entries() {
                    out.push_str(&format!("- {} [{}]({})\n", entry.date, entry.url, entry.url));
                }
            }
            PathKind::BlogIndex => {
                frontmatter::write(&mut out, &listing_frontmatter(&info.page));
                out.push_str("# blog\n\n");
                for post in self.site.blog_posts() {
                    out.push_str(&format!("- {} [{}](/blog/{})\n", post.date, post.title, post.slug));
                }
            }
            _ => {
                frontmatter::write(&mut out, &info.page.frontmatter());
                out.push_str(&info.page.markdown_source);
            }
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    /// Renders each feed template into the output directory.
    pub fn write_feeds(&self) -> Result<()> {
        let site = Value::from(self.site);
        for (template, output) in self.templates.feeds() {
            let path = self.output_directory.join(output);
            render_to_file(template, &path, &site)?;
            log::debug!("wrote `{}`", path.display());
        }
        Ok(())
    }
}

// Listing pages are regenerated from site data, so only the descriptive
// fields of their frontmatter carry over.
fn listing_frontmatter(page: &Page) -> frontmatter::Frontmatter {
    frontmatter::Frontmatter {
        template: None,
        ..page.frontmatter()
    }
}

fn render_to_file(template: &dyn Render, path: &Path, data: &Value) -> Result<()> {
    let file = File::create(path).map_err(|err| Error::WriteFile {
        path: path.to_owned(),
        err,
    })?;
    let mut w = BufWriter::new(file);
    template.render(&mut w, data)?;
    w.flush().map_err(|err| Error::WriteFile {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a page explicitly requests a template that doesn't
    /// exist.
    #[error("template `{0}` not found")]
    TemplateNotFound(String),

    /// An error during templating.
    #[error(transparent)]
    Template(#[from] template::Error),

    /// Returned when an output directory can't be created.
    #[error("creating directory `{}`: {err}", .path.display())]
    CreateDirectory { path: PathBuf, err: io::Error },

    /// Returned when an output file can't be written.
    #[error("writing `{}`: {err}", .path.display())]
    WriteFile { path: PathBuf, err: io::Error },

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::journal::JournalEntry;
    use crate::site::{BlogPost, SiteBuilder};
    use tempfile::TempDir;

    fn write_templates(dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir.join("feeds"))?;
        fs::write(dir.join("base.html"), "")?;
        for name in template::PAGE_TEMPLATES.iter() {
            fs::write(
                dir.join(format!("{}.html", name)),
                format!("{}:{{{{.Page.Title}}}}", name),
            )?;
        }
        for (name, _) in template::FEEDS.iter() {
            fs::write(
                dir.join(name),
                "{{range .FeedBlogPosts}}<item>{{xml .Title}}</item>{{end}}",
            )?;
        }
        Ok(())
    }

    fn site() -> Site {
        let entries = vec![JournalEntry {
            timestamp: 1700000000,
            date: String::from("2023-11-14"),
            date_rss: String::new(),
            date_atom: String::new(),
            url: String::from("https://example.com/a"),
        }];
        let mut builder = SiteBuilder::new(entries, chrono_tz::America::Los_Angeles);
        builder.push_blog_post(BlogPost {
            title: String::from("Fish & Chips"),
            slug: String::from("fish"),
            date: String::from("2024-01-01"),
            date_rss: String::new(),
            date_atom: String::new(),
            content: String::new(),
        });
        builder.finish()
    }

    fn info(output: &Path, kind: PathKind, template_name: &str, template: &str) -> PageInfo {
        PageInfo {
            page: Page {
                title: String::from("Title"),
                description: String::new(),
                date: String::new(),
                content: String::new(),
                markdown_source: String::from("Body"),
                url: String::from("/x"),
                slug: String::from("x"),
                template: template.to_owned(),
                draft: false,
            },
            source: PathBuf::from("content/x.md"),
            output_path: output.to_owned(),
            template_name: template_name.to_owned(),
            kind,
        }
    }

    struct Fixture {
        dir: TempDir,
        templates: Templates,
        site: Site,
    }

    impl Fixture {
        fn new() -> Result<Fixture> {
            let dir = TempDir::new().unwrap();
            write_templates(&dir.path().join("templates")).unwrap();
            let templates = Templates::load(&dir.path().join("templates"))?;
            Ok(Fixture {
                dir,
                templates,
                site: site(),
            })
        }

        fn writer(&self) -> Writer<'_> {
            Writer {
                templates: &self.templates,
                site: &self.site,
                output_directory: self.dir.path(),
                markdown_mirror: true,
            }
        }

        fn read(&self, relative: &str) -> String {
            fs::read_to_string(self.dir.path().join(relative)).unwrap()
        }
    }

    #[test]
    fn test_write_pages() -> Result<()> {
        let fixture = Fixture::new()?;
        let output = fixture.dir.path().join("out/sub/x.html");
        fixture
            .writer()
            .write_pages(&[info(&output, PathKind::Page, "page", "")])?;
        assert_eq!("page:Title", fixture.read("out/sub/x.html").trim());
        assert_eq!("---\ntitle: Title\n---\n\nBody\n", fixture.read("out/sub/x.md"));
        Ok(())
    }

    #[test]
    fn test_missing_default_template_falls_back() -> Result<()> {
        let fixture = Fixture::new()?;
        let output = fixture.dir.path().join("x.html");
        fixture
            .writer()
            .write_pages(&[info(&output, PathKind::Page, "nonexistent", "")])?;
        assert_eq!("page:Title", fixture.read("x.html").trim());
        Ok(())
    }

    #[test]
    fn test_missing_override_is_an_error() -> Result<()> {
        let fixture = Fixture::new()?;
        let output = fixture.dir.path().join("x.html");
        match fixture
            .writer()
            .write_pages(&[info(&output, PathKind::Page, "fancy", "fancy")])
        {
            Err(Error::Annotated(_, e)) => match *e {
                Error::TemplateNotFound(name) => assert_eq!("fancy", name),
                other => panic!("wanted TemplateNotFound; found {}", other),
            },
            Err(e) => panic!("wanted TemplateNotFound; found {}", e),
            Ok(()) => panic!("wanted TemplateNotFound; found Ok"),
        }
        Ok(())
    }

    #[test]
    fn test_listing_mirrors() -> Result<()> {
        let fixture = Fixture::new()?;
        let journal = fixture.dir.path().join("journal.html");
        let blog = fixture.dir.path().join("blog.html");
        fixture.writer().write_pages(&[
            info(&journal, PathKind::Journal, "journal", ""),
            info(&blog, PathKind::BlogIndex, "blog-index", ""),
        ])?;
        assert_eq!(
            "---\ntitle: Title\n---\n\n# journal\n\n\
             - 2023-11-14 [https://example.com/a](https://example.com/a)\n",
            fixture.read("journal.md")
        );
        assert_eq!(
            "---\ntitle: Title\n---\n\n# blog\n\n- 2024-01-01 [Fish & Chips](/blog/fish)\n",
            fixture.read("blog.md")
        );
        Ok(())
    }

    #[test]
    fn test_write_feeds() -> Result<()> {
        let fixture = Fixture::new()?;
        fixture.writer().write_feeds()?;
        for (_, output) in template::FEEDS.iter() {
            assert_eq!("<item>Fish &amp; Chips</item>\n", fixture.read(output));
        }
        Ok(())
    }
}
