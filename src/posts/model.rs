use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Publication state, stored as its integer discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
pub enum PostKind {
    Public = 0,
    Draft = 1,
    PendingReview = 2,
}

impl TryFrom<i32> for PostKind {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PostKind::Public),
            1 => Ok(PostKind::Draft),
            2 => Ok(PostKind::PendingReview),
            other => Err(other),
        }
    }
}

/// A blog article. `author_id`, `category_id` and the `tag_ids` list are
/// loose references resolved by lookup, not enforced relations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub alias: Option<String>,
    pub kind: PostKind,
    pub title: String,
    pub intro: Option<String>,
    pub content: String,
    pub sticky: bool,
    pub author_id: i64,
    pub author_ip: Option<String>,
    pub posted_at: OffsetDateTime,
    pub comment_count: i32,
    pub view_count: i32,
    pub tag_ids: Option<String>,
    pub category_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_discriminant() {
        for kind in [PostKind::Public, PostKind::Draft, PostKind::PendingReview] {
            assert_eq!(PostKind::try_from(kind as i32), Ok(kind));
        }
    }

    #[test]
    fn unknown_discriminant_is_rejected() {
        assert_eq!(PostKind::try_from(3), Err(3));
        assert_eq!(PostKind::try_from(-1), Err(-1));
    }
}
