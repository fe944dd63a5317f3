//! Site-wide data visible to every page and feed: the journal and the blog
//! post list.
//!
//! Blog posts are discovered while walking the content directory, but the
//! blog index (and any other page) may list posts that the walk hasn't
//! reached yet. So the data is split across two types: [`SiteBuilder`]
//! accumulates posts during collection, and [`SiteBuilder::finish`] sorts
//! them and hands back a read-only [`Site`]. Rendering only ever sees a
//! [`Site`], so it can't observe a partial or unsorted post list.

use chrono_tz::Tz;

use crate::date;
use crate::journal::JournalEntry;

/// The default number of items in each feed.
pub const FEED_ENTRY_LIMIT: usize = 50;

/// A blog post as it appears in listings and feeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlogPost {
    pub title: String,
    pub slug: String,

    /// `YYYY-MM-DD`, or empty if the post is undated.
    pub date: String,

    /// Empty if the post is undated.
    pub date_rss: String,

    /// Empty if the post is undated.
    pub date_atom: String,

    /// The rendered HTML body.
    pub content: String,
}

/// Collects site data during the content walk.
pub struct SiteBuilder {
    journal_entries: Vec<JournalEntry>,
    blog_posts: Vec<BlogPost>,
    timezone: Tz,
    feed_entry_limit: usize,
}

impl SiteBuilder {
    /// `journal_entries` must already be in display order (see
    /// [`crate::journal::parse`]).
    pub fn new(journal_entries: Vec<JournalEntry>, timezone: Tz) -> SiteBuilder {
        SiteBuilder {
            journal_entries,
            blog_posts: Vec::new(),
            timezone,
            feed_entry_limit: FEED_ENTRY_LIMIT,
        }
    }

    pub fn with_feed_entry_limit(mut self, limit: usize) -> SiteBuilder {
        self.feed_entry_limit = limit;
        self
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    pub fn push_blog_post(&mut self, post: BlogPost) {
        self.blog_posts.push(post);
    }

    /// Sorts the blog posts newest first and freezes the site data. Posts
    /// are compared by their `YYYY-MM-DD` date strings; posts with the same
    /// date keep the order in which they were pushed, and undated posts sort
    /// last.
    pub fn finish(mut self) -> Site {
        self.blog_posts.sort_by(|a, b| b.date.cmp(&a.date));
        Site {
            journal_entries: self.journal_entries,
            blog_posts: self.blog_posts,
            timezone: self.timezone,
            feed_entry_limit: self.feed_entry_limit,
        }
    }
}

/// Sorted, read-only site data.
#[derive(Debug)]
pub struct Site {
    journal_entries: Vec<JournalEntry>,
    blog_posts: Vec<BlogPost>,
    timezone: Tz,
    feed_entry_limit: usize,
}

impl Site {
    /// All journal entries, newest first.
    pub fn journal_entries(&self) -> &[JournalEntry] {
        &self.journal_entries
    }

    /// All blog posts, newest first.
    pub fn blog_posts(&self) -> &[BlogPost] {
        &self.blog_posts
    }

    /// The most recent journal entries, for feeds.
    pub fn feed_journal_entries(&self) -> &[JournalEntry] {
        let n = self.journal_entries.len().min(self.feed_entry_limit);
        &self.journal_entries[..n]
    }

    /// The most recent blog posts, for feeds.
    pub fn feed_blog_posts(&self) -> &[BlogPost] {
        let n = self.blog_posts.len().min(self.feed_entry_limit);
        &self.blog_posts[..n]
    }

    /// The Atom date of the newest journal entry, or now if there are none.
    pub fn latest_journal_date_atom(&self) -> String {
        match self.journal_entries.first() {
            Some(entry) => entry.date_atom.clone(),
            None => date::now_atom(&self.timezone),
        }
    }

    /// The Atom date of the newest dated blog post, or now if there are
    /// none.
    pub fn latest_blog_date_atom(&self) -> String {
        self.blog_posts
            .iter()
            .find(|post| !post.date_atom.is_empty())
            .map(|post| post.date_atom.clone())
            .unwrap_or_else(|| date::now_atom(&self.timezone))
    }
}
