//! Conversions from the site's data types into template [`Value`]s. Field
//! names follow Go template conventions (`.Page.Title`, `.Site.BlogPosts`,
//! etc.).

use gtmpl_value::Value;
use std::collections::HashMap;

use crate::journal::JournalEntry;
use crate::page::Page;
use crate::site::{BlogPost, Site};

fn object<const N: usize>(fields: [(&str, Value); N]) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect::<HashMap<String, Value>>(),
    )
}

fn array<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>) -> Value
where
    &'a T: Into<Value>,
{
    Value::Array(items.into_iter().map(Into::into).collect())
}

impl From<&JournalEntry> for Value {
    fn from(e: &JournalEntry) -> Value {
        object([
            ("Timestamp", Value::from(e.timestamp)),
            ("Date", Value::from(e.date.as_str())),
            ("DateRSS", Value::from(e.date_rss.as_str())),
            ("DateAtom", Value::from(e.date_atom.as_str())),
            ("URL", Value::from(e.url.as_str())),
        ])
    }
}

impl From<&BlogPost> for Value {
    fn from(p: &BlogPost) -> Value {
        object([
            ("Title", Value::from(p.title.as_str())),
            ("Slug", Value::from(p.slug.as_str())),
            ("Date", Value::from(p.date.as_str())),
            ("DateRSS", Value::from(p.date_rss.as_str())),
            ("DateAtom", Value::from(p.date_atom.as_str())),
            ("Content", Value::from(p.content.as_str())),
        ])
    }
}

impl From<&Page> for Value {
    fn from(p: &Page) -> Value {
        object([
            ("Title", Value::from(p.title.as_str())),
            ("Description", Value::from(p.description.as_str())),
            ("Date", Value::from(p.date.as_str())),
            ("Content", Value::from(p.content.as_str())),
            ("URL", Value::from(p.url.as_str())),
            ("Slug", Value::from(p.slug.as_str())),
            ("Template", Value::from(p.template.as_str())),
            ("Draft", Value::from(p.draft)),
            ("MarkdownURL", Value::from(p.markdown_url())),
        ])
    }
}

impl From<&Site> for Value {
    /// The site object is computed once per build and shared (cloned) into
    /// every page's data, so the accessor results are captured as plain
    /// fields.
    fn from(s: &Site) -> Value {
        object([
            ("JournalEntries", array(s.journal_entries())),
            ("BlogPosts", array(s.blog_posts())),
            ("FeedJournalEntries", array(s.feed_journal_entries())),
            ("FeedBlogPosts", array(s.feed_blog_posts())),
            (
                "LatestJournalDateAtom",
                Value::from(s.latest_journal_date_atom()),
            ),
            ("LatestBlogDateAtom", Value::from(s.latest_blog_date_atom())),
        ])
    }
}

/// The data a page template is executed with: `.Page` and `.Site`.
///
/// `gtmpl` contexts own their data, so `site` is deep-copied into every
/// page's data, blog post bodies included. Cost grows with pages times
/// posts; fine for a personal site, but the first thing to revisit if builds
/// get slow.
pub fn page_data(page: &Page, site: &Value) -> Value {
    object([("Page", Value::from(page)), ("Site", site.clone())])
}
