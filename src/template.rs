//! Loads the site's templates and renders data through them. Templates use
//! Go template syntax (via [`gtmpl`]).
//!
//! The templates directory is laid out like this:
//!
//! ```text
//! templates/
//!   base.html        shared layout, parsed ahead of every page template
//!   home.html
//!   page.html
//!   blog-post.html
//!   blog-index.html
//!   journal.html
//!   feeds/
//!     journal.xml
//!     journal.atom
//!     blog.xml
//!     blog.atom
//! ```
//!
//! Page templates are parsed as the concatenation of `base.html` and the page
//! file, so `base.html` can `{{template}}` blocks the page `{{define}}`s.
//! Page templates can escape text with `{{html .X}}`, feed templates with
//! `{{xml .X}}`.

use gtmpl::{Context, Template};
use gtmpl_value::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Names of the page templates, without the `.html` extension.
pub const PAGE_TEMPLATES: [&str; 5] = ["home", "page", "blog-post", "blog-index", "journal"];

/// The fallback page template for pages that don't request one explicitly.
pub const DEFAULT_PAGE_TEMPLATE: &str = "page";

/// Feed templates (relative to the templates directory) and the files they
/// are rendered to (relative to the output directory).
pub const FEEDS: [(&str, &str); 4] = [
    ("feeds/journal.xml", "journal.xml"),
    ("feeds/journal.atom", "journal.atom"),
    ("feeds/blog.xml", "blog.xml"),
    ("feeds/blog.atom", "blog.atom"),
];

const BASE_TEMPLATE: &str = "base.html";

/// Something that renders template data to a writer.
pub trait Render {
    fn render(&self, w: &mut dyn Write, data: &Value) -> Result<()>;
}

/// An HTML page template, composed with the shared base layout.
pub struct PageTemplate {
    name: String,
    template: Template,
}

impl PageTemplate {
    fn load(name: &str, base: &Path, page: &Path) -> Result<PageTemplate> {
        let mut template = Template::default();
        template.add_func("html", html);
        parse_template(&mut template, name, [base, page].iter())?;
        Ok(PageTemplate {
            name: name.to_owned(),
            template,
        })
    }
}

impl Render for PageTemplate {
    fn render(&self, w: &mut dyn Write, data: &Value) -> Result<()> {
        execute(&self.template, &self.name, w, data)
    }
}

/// A plain-text template for RSS and Atom feeds.
pub struct FeedTemplate {
    name: String,
    template: Template,
}

impl FeedTemplate {
    fn load(name: &str, path: &Path) -> Result<FeedTemplate> {
        let mut template = Template::default();
        template.add_func("xml", xml);
        parse_template(&mut template, name, std::iter::once(path))?;
        Ok(FeedTemplate {
            name: name.to_owned(),
            template,
        })
    }
}

impl Render for FeedTemplate {
    fn render(&self, w: &mut dyn Write, data: &Value) -> Result<()> {
        execute(&self.template, &self.name, w, data)
    }
}

/// All of the site's templates, looked up by logical name.
pub struct Templates {
    pages: HashMap<String, PageTemplate>,
    feeds: Vec<(FeedTemplate, &'static str)>,
}

impl Templates {
    /// Loads and parses every page and feed template in `dir`.
    pub fn load(dir: &Path) -> Result<Templates> {
        let base = dir.join(BASE_TEMPLATE);
        let mut pages = HashMap::new();
        for name in PAGE_TEMPLATES.iter() {
            let page = dir.join(format!("{}.html", name));
            pages.insert(name.to_string(), PageTemplate::load(name, &base, &page)?);
        }

        let mut feeds = Vec::with_capacity(FEEDS.len());
        for (name, output) in FEEDS.iter() {
            feeds.push((FeedTemplate::load(name, &dir.join(name))?, *output));
        }

        Ok(Templates { pages, feeds })
    }

    /// Looks up a page template by name (e.g., `blog-post`).
    pub fn page(&self, name: &str) -> Option<&PageTemplate> {
        self.pages.get(name)
    }

    /// The feed templates, each paired with its output file name.
    pub fn feeds(&self) -> impl Iterator<Item = (&FeedTemplate, &'static str)> {
        self.feeds.iter().map(|(template, output)| (template, *output))
    }
}

// Loads the template file contents, concatenates them, and parses the result
// into `template`.
fn parse_template<P: AsRef<Path>>(
    template: &mut Template,
    name: &str,
    files: impl Iterator<Item = P>,
) -> Result<()> {
    let mut contents = String::new();
    for file in files {
        let file = file.as_ref();
        contents.push_str(&fs::read_to_string(file).map_err(|err| Error::OpenTemplateFile {
            path: file.to_owned(),
            err,
        })?);
        contents.push('\n');
    }

    template.parse(&contents).map_err(|err| Error::Parse {
        name: name.to_owned(),
        err,
    })
}

fn execute(template: &Template, name: &str, w: &mut dyn Write, data: &Value) -> Result<()> {
    let execute_error = |err| Error::Execute {
        name: name.to_owned(),
        err,
    };
    let context = Context::from(data.clone()).map_err(execute_error)?;
    template.execute(&mut &mut *w, &context).map_err(execute_error)
}

fn escape_arg(
    args: &[Value],
    func: &str,
    escape: fn(&str) -> String,
) -> std::result::Result<Value, String> {
    match args {
        [Value::String(s)] => Ok(Value::String(escape(s))),
        [other] => Ok(Value::String(escape(&other.to_string()))),
        _ => Err(format!("{} expects exactly one argument, got {}", func, args.len())),
    }
}

// Template helper: `{{xml .Title}}`.
fn xml(args: &[Value]) -> std::result::Result<Value, String> {
    escape_arg(args, "xml", escape_xml)
}

// Template helper: `{{html .Title}}`.
fn html(args: &[Value]) -> std::result::Result<Value, String> {
    escape_arg(args, "html", crate::markdown::escape_attribute)
}

/// Escapes the five XML special characters, using `&quot;` and `&apos;`
/// entities exactly as feed readers of the existing site expect.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or executing a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    #[error("opening template file `{}`: {err}", .path.display())]
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing template files.
    #[error("parsing template {name}: {err}")]
    Parse { name: String, err: String },

    /// Returned for errors while executing a template.
    #[error("executing template {name}: {err}")]
    Execute { name: String, err: String },
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn render(template: &str, data: Value) -> Result<String> {
        let mut t = Template::default();
        t.add_func("xml", xml);
        t.parse(template).map_err(|err| Error::Parse {
            name: String::from("test"),
            err,
        })?;
        let feed = FeedTemplate {
            name: String::from("test"),
            template: t,
        };
        let mut out = Vec::new();
        feed.render(&mut out, &data)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            "Tom &amp; Jerry&apos;s &lt;&quot;show&quot;&gt;",
            escape_xml(r#"Tom & Jerry's <"show">"#)
        );
    }

    #[test]
    fn test_xml_helper() -> Result<()> {
        let mut m = HashMap::new();
        m.insert(String::from("Title"), Value::from("Fish & Chips"));
        assert_eq!(
            "<title>Fish &amp; Chips</title>",
            render("<title>{{xml .Title}}</title>", Value::Object(m))?
        );
        Ok(())
    }

    #[test]
    fn test_helper_arity() {
        assert!(xml(&[]).is_err());
        assert!(html(&[Value::from("a"), Value::from("b")]).is_err());
    }

    #[test]
    fn test_load_missing_templates() {
        match Templates::load(Path::new("./does/not/exist")) {
            Err(Error::OpenTemplateFile { path, .. }) => {
                assert!(path.ends_with(BASE_TEMPLATE), "{}", path.display())
            }
            Err(e) => panic!("wanted OpenTemplateFile; found {}", e),
            Ok(_) => panic!("wanted OpenTemplateFile; found Ok"),
        }
    }
}
