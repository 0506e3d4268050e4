use serde::Deserialize;
use sqlx::PgPool;

use super::model::{render, Comment};
use crate::render::SafeHtmlRenderer;

#[derive(Debug, Deserialize)]
pub struct CreateCommentData {
    pub author: String,
    pub content: String,
    pub email: Option<String>,
    pub homepage: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub post_id: i64,
}

/// Insert a comment. The sanitized rendering is derived here, on the write
/// path, never on read.
pub async fn create_comment(
    db: &PgPool,
    data: CreateCommentData,
    renderer: &dyn SafeHtmlRenderer,
) -> anyhow::Result<Comment> {
    let content_html = render(&data.content, renderer);
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (author, content, content_html, email, homepage,
                              ip, user_agent, post_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, author, content, content_html, email, homepage,
                  posted_at, ip, user_agent, post_id
        "#,
    )
    .bind(&data.author)
    .bind(&data.content)
    .bind(&content_html)
    .bind(&data.email)
    .bind(&data.homepage)
    .bind(&data.ip)
    .bind(&data.user_agent)
    .bind(data.post_id)
    .fetch_one(db)
    .await?;
    Ok(comment)
}

pub async fn get_comment_by_id(db: &PgPool, comment_id: i64) -> anyhow::Result<Option<Comment>> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, author, content, content_html, email, homepage, posted_at,
               ip, user_agent, post_id
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_optional(db)
    .await?;
    Ok(comment)
}

/// Comments of one post, oldest first.
pub async fn list_by_post(
    db: &PgPool,
    post_id: i64,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Comment>> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, author, content, content_html, email, homepage, posted_at,
               ip, user_agent, post_id
        FROM comments
        WHERE post_id = $1
        ORDER BY posted_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(post_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(comments)
}

/// Replace a comment's content, re-deriving the rendering in the same
/// statement.
pub async fn update_content(
    db: &PgPool,
    comment_id: i64,
    raw: &str,
    renderer: &dyn SafeHtmlRenderer,
) -> anyhow::Result<Option<Comment>> {
    let content_html = render(raw, renderer);
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET content = $2, content_html = $3
        WHERE id = $1
        RETURNING id, author, content, content_html, email, homepage,
                  posted_at, ip, user_agent, post_id
        "#,
    )
    .bind(comment_id)
    .bind(raw)
    .bind(&content_html)
    .fetch_optional(db)
    .await?;
    Ok(comment)
}

pub async fn delete_comment(db: &PgPool, comment_id: i64) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
