//! HTML sanitization over the markdown event stream.
//!
//! Raw HTML (block or inline) is downgraded to text so the HTML writer escapes
//! it. Link and image destinations must use an allowed scheme or be relative.

use pulldown_cmark::{CowStr, Event, Tag};
use tracing::debug;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Neutralize every event that could place executable markup in the output.
pub fn sanitize_events<'a, I>(events: I) -> impl Iterator<Item = Event<'a>>
where
    I: Iterator<Item = Event<'a>>,
{
    events.map(sanitize_event)
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) => {
            debug!(len = raw.len(), "Escaping raw HTML in markdown");
            Event::Text(raw)
        }
        Event::Start(tag) => Event::Start(sanitize_tag(tag)),
        Event::End(tag) => Event::End(sanitize_tag(tag)),
        other => other,
    }
}

fn sanitize_tag(tag: Tag<'_>) -> Tag<'_> {
    match tag {
        Tag::Link(kind, dest, title) if !is_safe_url(&dest) => {
            Tag::Link(kind, CowStr::Borrowed("#"), title)
        }
        Tag::Image(kind, dest, title) if !is_safe_url(&dest) => {
            Tag::Image(kind, CowStr::Borrowed(""), title)
        }
        other => other,
    }
}

/// Whether `url` is relative or uses an allowed scheme.
///
/// Whitespace and control characters are ignored, since browsers strip them
/// before resolving the scheme (`java\tscript:`).
pub fn is_safe_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.split_once(':') {
        None => true,
        Some((scheme, _)) if scheme.contains(['/', '?', '#']) => true,
        Some((scheme, _)) => ALLOWED_SCHEMES.contains(&scheme),
    }
}

#[cfg(test)]
mod tests {
    use crate::render_html;

    use super::*;

    #[test]
    fn test_script_block_is_escaped() {
        let html = render_html("<script>alert(1)</script>");
        assert!(!html.contains("<script"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_inline_onerror_is_escaped() {
        let html = render_html("look at this <img src=x onerror=alert(1)> product");
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn test_javascript_link_is_neutralized() {
        let html = render_html("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("<a href=\"#\">click</a>"));
    }

    #[test]
    fn test_data_image_is_dropped() {
        let html = render_html("![x](data:text/html;base64,PHNjcmlwdD4=)");
        assert!(!html.contains("data:"));
    }

    #[test]
    fn test_safe_urls() {
        assert!(is_safe_url("https://dummyjson.com/products/1"));
        assert!(is_safe_url("/products/1"));
        assert!(is_safe_url("mailto:shop@example.com"));
        assert!(is_safe_url("thumb.jpg?size=small:large"));
        assert!(!is_safe_url("JavaScript:alert(1)"));
        assert!(!is_safe_url("java\tscript:alert(1)"));
        assert!(!is_safe_url("vbscript:msgbox"));
    }
}
