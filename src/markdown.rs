//! Converts Markdown to HTML. Rendering is delegated to
//! [`pulldown_cmark::html::push_html`]; before events reach it, they pass
//! through three rewrites:
//!
//! 1. Headings without an explicit `{#id}` get an id derived from their text
//!    so they can be linked to.
//! 2. `^x^` and `~x~` runs left in text (e.g. the intraword `2^10^` and
//!    `H~2~O`, which the parser's own extensions don't match) become
//!    `<sup>` and `<sub>`.
//! 3. Links are replaced with raw anchor tags according to a link policy:
//!    external links open in a new tab with `rel="noopener"`, and links with
//!    a scheme we don't recognize (e.g., `javascript:` or `data:`) are made
//!    inert.

use pulldown_cmark::{
    html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use std::collections::HashSet;

/// Converts `markdown` to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_SUPERSCRIPT);
    options.insert(Options::ENABLE_SUBSCRIPT);

    let parser = TextMergeStream::new(Parser::new_ext(markdown, options));
    let events = scripts(anchor_headings(parser.collect()));
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter().map(convert_link));
    out
}

// Fills in the `id` of every heading that doesn't already have one. The id is
// the slugified heading text; ids already in use in the document (explicit
// or generated) are suffixed with `-1`, `-2`, etc.
fn anchor_headings(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut taken: HashSet<String> = events
        .iter()
        .filter_map(|ev| match ev {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();
    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let text: String = events[i + 1..]
            .iter()
            .take_while(|ev| !matches!(ev, Event::End(TagEnd::Heading(_))))
            .filter_map(|ev| match ev {
                Event::Text(text) | Event::Code(text) => Some(&**text),
                _ => None,
            })
            .collect();
        let anchor = unique_anchor(&mut taken, &text);

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor));
        }
    }
    events
}

fn unique_anchor(taken: &mut HashSet<String>, text: &str) -> String {
    let mut base = slug::slugify(text);
    if base.is_empty() {
        base = String::from("section");
    }
    let mut anchor = base.clone();
    let mut n = 0;
    while taken.contains(&anchor) {
        n += 1;
        anchor = format!("{}-{}", base, n);
    }
    taken.insert(anchor.clone());
    anchor
}

// Rewrites `^x^` and `~x~` in text (outside code blocks) into superscript and
// subscript tags.
fn scripts(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut in_code_block = false;
    for ev in events {
        match &ev {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if !in_code_block && text.contains(is_script_delimiter) => {
                push_scripts(text, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(ev);
    }
    out
}

fn is_script_delimiter(c: char) -> bool {
    c == '^' || c == '~'
}

fn push_scripts<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut plain = String::new();
    let mut rest = text;
    while let Some(i) = rest.find(is_script_delimiter) {
        let delimiter = &rest[i..i + 1];
        let after = &rest[i + 1..];
        let body = match after.find(delimiter) {
            Some(end) if end > 0 && !after[..end].contains(char::is_whitespace) => {
                &after[..end]
            }
            _ => {
                plain.push_str(&rest[..i + 1]);
                rest = after;
                continue;
            }
        };

        plain.push_str(&rest[..i]);
        if !plain.is_empty() {
            out.push(Event::Text(CowStr::from(std::mem::take(&mut plain))));
        }
        let tag = match delimiter {
            "^" => "sup",
            _ => "sub",
        };
        out.push(Event::InlineHtml(CowStr::from(format!("<{}>", tag))));
        out.push(Event::Text(CowStr::from(body.to_owned())));
        out.push(Event::InlineHtml(CowStr::from(format!("</{}>", tag))));
        rest = &after[body.len() + 1..];
    }
    plain.push_str(rest);
    if !plain.is_empty() {
        out.push(Event::Text(CowStr::from(plain)));
    }
}

fn convert_link(ev: Event<'_>) -> Event<'_> {
    match ev {
        Event::Start(Tag::Link {
            link_type, dest_url, ..
        }) => Event::InlineHtml(CowStr::from(open_anchor(link_type, &dest_url))),
        Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::Borrowed("</a>")),
        _ => ev,
    }
}

/// How a link destination is treated when rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// `http://` and `https://` links. Opened in a new tab, without giving
    /// the target a handle back to this page.
    External,

    /// `mailto:` and `tel:` links.
    Contact,

    /// Relative and root-relative links.
    Internal,

    /// Anything else with a scheme, e.g., `javascript:` and `data:` URIs.
    /// Rendered with `href="#"`.
    Blocked,
}

impl LinkKind {
    pub fn classify(dest: &str) -> LinkKind {
        let lower = dest.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            LinkKind::External
        } else if lower.starts_with("mailto:") || lower.starts_with("tel:") {
            LinkKind::Contact
        } else if lower.contains(':') && !lower.starts_with('/') {
            LinkKind::Blocked
        } else {
            LinkKind::Internal
        }
    }
}

/// Returns the opening `<a>` tag for a link to `dest`.
pub fn open_anchor(link_type: LinkType, dest: &str) -> String {
    // pulldown-cmark leaves the scheme off of email autolinks.
    let dest = match link_type {
        LinkType::Email => format!("mailto:{}", dest),
        _ => dest.to_owned(),
    };
    match LinkKind::classify(&dest) {
        LinkKind::External => format!(
            r#"<a href="{}" target="_blank" rel="noopener">"#,
            escape_attribute(&dest)
        ),
        LinkKind::Contact | LinkKind::Internal => {
            format!(r#"<a href="{}">"#, escape_attribute(&dest))
        }
        LinkKind::Blocked => String::from(r##"<a href="#">"##),
    }
}

/// Escapes `s` for use in an HTML attribute value. Quotes are written as
/// `&#34;` and `&#39;`, the entities the existing site's pages use, which
/// `pulldown_cmark::escape` doesn't produce.
pub fn escape_attribute(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    const NEW_CONTEXT: &str = r#"target="_blank" rel="noopener""#;

    #[test]
    fn test_external_links_open_new_context() {
        for dest in &["http://example.com", "https://example.com/a?b=c", "HTTPS://EXAMPLE.COM"] {
            let html = to_html(&format!("[x]({})", dest));
            assert!(html.contains(NEW_CONTEXT), "{}", html);
        }
    }

    #[test]
    fn test_safe_links_stay_in_context() {
        for (dest, wanted) in &[
            ("mailto:me@example.com", r#"<a href="mailto:me@example.com">x</a>"#),
            ("tel:+15555550100", r#"<a href="tel:+15555550100">x</a>"#),
            ("/about", r#"<a href="/about">x</a>"#),
            ("notes/x", r#"<a href="notes/x">x</a>"#),
            ("#top", r##"<a href="#top">x</a>"##),
        ] {
            let html = to_html(&format!("[x]({})", dest));
            assert!(!html.contains(NEW_CONTEXT), "{}", html);
            assert!(html.contains(wanted), "wanted {}; found {}", wanted, html);
        }
    }

    #[test]
    fn test_unsafe_links_are_inert() {
        assert_eq!(
            "<p><a href=\"#\">click</a></p>\n",
            to_html("[click](javascript:alert(1))")
        );
        for dest in &["data:text/html;base64,AAAA", "vbscript:msgbox", "JavaScript:void(0)"] {
            let html = to_html(&format!("[x]({})", dest));
            assert!(html.contains(r##"<a href="#">x</a>"##), "{}", html);
        }
    }

    #[test]
    fn test_link_destination_is_escaped() {
        assert_eq!(
            r#"<a href="/search?q=a&amp;b=&#34;c&#34;">"#,
            open_anchor(LinkType::Inline, r#"/search?q=a&b="c""#)
        );
        assert_eq!(
            r#"<a href="https://example.com/&lt;&#39;&gt;" target="_blank" rel="noopener">"#,
            open_anchor(LinkType::Inline, "https://example.com/<'>")
        );
    }

    #[test]
    fn test_email_autolink() {
        let html = to_html("<me@example.com>");
        assert!(
            html.contains(r#"<a href="mailto:me@example.com">me@example.com</a>"#),
            "{}",
            html
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(LinkKind::External, LinkKind::classify("https://a.b"));
        assert_eq!(LinkKind::Contact, LinkKind::classify("Mailto:a@b"));
        assert_eq!(LinkKind::Internal, LinkKind::classify("/a:b"));
        assert_eq!(LinkKind::Internal, LinkKind::classify("../up"));
        assert_eq!(LinkKind::Blocked, LinkKind::classify("ftp://a.b"));
    }

    #[test]
    fn test_heading_anchors() {
        let html = to_html("# Hello, World!\n\n## Hello, World!\n\n### `code` span {#custom}\n");
        assert!(html.contains(r#"<h1 id="hello-world">"#), "{}", html);
        assert!(html.contains(r#"<h2 id="hello-world-1">"#), "{}", html);
        assert!(html.contains(r#"<h3 id="custom">"#), "{}", html);
        assert_eq!(html, to_html("# Hello, World!\n\n## Hello, World!\n\n### `code` span {#custom}\n"));
    }

    #[test]
    fn test_superscript_and_subscript() {
        let html = to_html("E = mc^2^ and H~2~O");
        assert!(html.contains("mc<sup>2</sup>"), "{}", html);
        assert!(html.contains("H<sub>2</sub>O"), "{}", html);
        assert_eq!("<p>2<sup>10</sup> &lt; x</p>\n", to_html("2^10^ < x"));
    }

    #[test]
    fn test_scripts_need_a_closed_run_without_spaces() {
        assert_eq!("<p>a ^ b ^ c</p>\n", to_html("a ^ b ^ c"));
        assert_eq!("<p>x^y</p>\n", to_html("x^y"));
        assert!(to_html("~~gone~~").contains("<del>gone</del>"));
    }

    #[test]
    fn test_scripts_skip_code() {
        assert!(to_html("`a^b^`").contains("<code>a^b^</code>"));
        assert!(to_html("```\nH~2~O\n```\n").contains("H~2~O"));
    }

    #[test]
    fn test_explicit_heading_ids_are_reserved() {
        let html = to_html("# A {#intro}\n\n# Intro\n");
        assert!(html.contains(r#"<h1 id="intro">A</h1>"#), "{}", html);
        assert!(html.contains(r#"<h1 id="intro-1">Intro</h1>"#), "{}", html);
    }
}
