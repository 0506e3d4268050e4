/// Markdown-to-HTML rendering and sanitization live outside this crate.
/// The comment write path calls through this boundary synchronously so the
/// stored HTML is always derived from the latest raw content.
pub trait SafeHtmlRenderer: Send + Sync {
    /// Pure function: render `raw` to HTML, stripping every tag not in
    /// `allowed_tags`.
    fn render_safe_html(&self, raw: &str, allowed_tags: &[&str]) -> String;
}

/// Tags comments may keep after sanitization.
pub const COMMENT_ALLOWED_TAGS: &[&str] =
    &["a", "abbr", "acronym", "p", "code", "em", "i", "strong"];
