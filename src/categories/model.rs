use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A post category. `root_id`/`parent_id` form a loose hierarchy by id;
/// no cycle detection at this layer. `post_count` is a denormalized
/// aggregate maintained by the repo, not computed on read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "category_order")]
    pub order: i32,
    pub post_count: i32,
    pub alias: Option<String>,
    pub intro: Option<String>,
    pub root_id: Option<i64>,
    pub parent_id: Option<i64>,
}
