//! Markdown to HTML renderer.
//!
//! GFM tables, strikethrough and task lists are enabled; single newlines are
//! rendered as line breaks the way chat clients expect.

use pulldown_cmark::{html, Event, Options, Parser};

use crate::sanitize::sanitize_events;

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    options: Options,
    breaks: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
            breaks: true,
        }
    }
}

impl Renderer {
    /// Keep soft line breaks as whitespace instead of `<br />`.
    pub fn without_breaks(mut self) -> Self {
        self.breaks = false;
        self
    }

    /// Render `markdown` to a sanitized HTML fragment.
    pub fn render(&self, markdown: &str) -> String {
        let breaks = self.breaks;
        let events = Parser::new_ext(markdown, self.options).map(move |event| match event {
            Event::SoftBreak if breaks => Event::HardBreak,
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);
        html::push_html(&mut out, sanitize_events(events));
        out
    }
}
