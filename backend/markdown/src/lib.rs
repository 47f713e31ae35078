//! Markdown rendering for chat transcripts.
//!
//! Converts user prompts and model replies to HTML fragments. Every fragment
//! goes through the sanitizer, so raw HTML and script URLs never reach the page.

pub mod renderer;
pub mod sanitize;

pub use renderer::Renderer;
pub use sanitize::is_safe_url;

/// Render `markdown` with the default [`Renderer`].
pub fn render_html(markdown: &str) -> String {
    Renderer::default().render(markdown)
}
