use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::render::{SafeHtmlRenderer, COMMENT_ALLOWED_TAGS};

/// A visitor comment. `author` is a free-text display name, not an account
/// reference; `post_id` is a loose reference to the commented post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub content_html: String,
    pub email: Option<String>,
    pub homepage: Option<String>,
    pub posted_at: OffsetDateTime,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub post_id: i64,
}

impl Comment {
    /// Writing content is one operation: store the raw text and re-derive
    /// the sanitized rendering before the entity is consistent again.
    pub fn set_content(&mut self, raw: impl Into<String>, renderer: &dyn SafeHtmlRenderer) {
        self.content = raw.into();
        self.content_html = render(&self.content, renderer);
    }
}

/// The single path from raw comment text to stored HTML.
pub(crate) fn render(raw: &str, renderer: &dyn SafeHtmlRenderer) -> String {
    renderer.render_safe_html(raw, COMMENT_ALLOWED_TAGS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    /// Stand-in for the external markdown/sanitizer pipeline.
    struct Uppercaser;

    impl SafeHtmlRenderer for Uppercaser {
        fn render_safe_html(&self, raw: &str, allowed_tags: &[&str]) -> String {
            assert_eq!(allowed_tags, COMMENT_ALLOWED_TAGS);
            format!("<p>{}</p>", raw.to_uppercase())
        }
    }

    fn make_comment() -> Comment {
        let mut comment = Comment {
            id: 1,
            author: "visitor".into(),
            content: String::new(),
            content_html: String::new(),
            email: None,
            homepage: None,
            posted_at: datetime!(2024-01-01 00:00 UTC),
            ip: None,
            user_agent: None,
            post_id: 42,
        };
        comment.set_content("first", &Uppercaser);
        comment
    }

    #[test]
    fn content_write_recomputes_rendering() {
        let comment = make_comment();
        assert_eq!(comment.content, "first");
        assert_eq!(comment.content_html, "<p>FIRST</p>");
    }

    #[test]
    fn rendering_tracks_the_latest_content() {
        let mut comment = make_comment();
        comment.set_content("second draft", &Uppercaser);
        assert_eq!(comment.content, "second draft");
        assert_eq!(comment.content_html, "<p>SECOND DRAFT</p>");
    }
}
