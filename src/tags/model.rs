use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A post tag. `post_count` is denormalized, maintained by the repo.
/// `template` and `meta` carry per-tag presentation overrides for the
/// rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "tag_order")]
    pub order: i32,
    pub post_count: i32,
    pub alias: Option<String>,
    pub intro: Option<String>,
    pub template: Option<String>,
    pub meta: Option<String>,
}
