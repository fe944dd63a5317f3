//! The library code for the `folio` static site generator. A build turns a
//! content tree of Markdown files, a link journal, and a directory of Go-style
//! templates into HTML pages, Markdown mirrors, and RSS/Atom feeds.
//!
//! The build runs in two passes around a sort barrier:
//!
//! 1. Collecting pages from source files on disk ([`crate::collect`]). Each
//!    file's frontmatter is parsed ([`crate::frontmatter`]), its body is
//!    rendered ([`crate::markdown`]), and its path decides its URL and
//!    template ([`crate::route`]). Blog posts are recorded in a
//!    [`site::SiteBuilder`].
//! 2. Rendering the collected pages and the feeds ([`crate::write`]) against
//!    the sorted, read-only [`site::Site`].
//!
//! [`build::build_site`] ties the two together.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod collect;
pub mod config;
pub mod date;
pub mod frontmatter;
pub mod journal;
pub mod markdown;
pub mod page;
pub mod route;
pub mod site;
pub mod template;
pub mod value;
pub mod write;
