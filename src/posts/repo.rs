use serde::Deserialize;
use sqlx::PgPool;

use super::model::{Post, PostKind};

#[derive(Debug, Deserialize)]
pub struct CreatePostData {
    pub title: String,
    pub intro: Option<String>,
    pub content: String,
    pub kind: PostKind,
    pub sticky: bool,
    pub author_id: i64,
    pub author_ip: Option<String>,
    pub alias: Option<String>,
    pub tag_ids: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostData {
    pub title: String,
    pub intro: Option<String>,
    pub content: String,
    pub kind: PostKind,
    pub sticky: bool,
    pub alias: Option<String>,
    pub tag_ids: Option<String>,
    pub category_id: Option<i64>,
}

pub async fn create_post(db: &PgPool, data: CreatePostData) -> anyhow::Result<Post> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, intro, content, kind, sticky, author_id,
                           author_ip, alias, tag_ids, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, alias, kind, title, intro, content, sticky, author_id,
                  author_ip, posted_at, comment_count, view_count, tag_ids,
                  category_id
        "#,
    )
    .bind(&data.title)
    .bind(&data.intro)
    .bind(&data.content)
    .bind(data.kind)
    .bind(data.sticky)
    .bind(data.author_id)
    .bind(&data.author_ip)
    .bind(&data.alias)
    .bind(&data.tag_ids)
    .bind(data.category_id)
    .fetch_one(db)
    .await?;
    Ok(post)
}

pub async fn get_post_by_id(db: &PgPool, post_id: i64) -> anyhow::Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, alias, kind, title, intro, content, sticky, author_id,
               author_ip, posted_at, comment_count, view_count, tag_ids,
               category_id
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(db)
    .await?;
    Ok(post)
}

/// Public posts, sticky ones first, newest first within each group.
pub async fn list_public(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, alias, kind, title, intro, content, sticky, author_id,
               author_ip, posted_at, comment_count, view_count, tag_ids,
               category_id
        FROM posts
        WHERE kind = $1
        ORDER BY sticky DESC, posted_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(PostKind::Public)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(posts)
}

pub async fn list_by_author(
    db: &PgPool,
    author_id: i64,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, alias, kind, title, intro, content, sticky, author_id,
               author_ip, posted_at, comment_count, view_count, tag_ids,
               category_id
        FROM posts
        WHERE author_id = $1
        ORDER BY posted_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(posts)
}

pub async fn update_post(
    db: &PgPool,
    post_id: i64,
    data: UpdatePostData,
) -> anyhow::Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $2, intro = $3, content = $4, kind = $5, sticky = $6,
            alias = $7, tag_ids = $8, category_id = $9
        WHERE id = $1
        RETURNING id, alias, kind, title, intro, content, sticky, author_id,
                  author_ip, posted_at, comment_count, view_count, tag_ids,
                  category_id
        "#,
    )
    .bind(post_id)
    .bind(&data.title)
    .bind(&data.intro)
    .bind(&data.content)
    .bind(data.kind)
    .bind(data.sticky)
    .bind(&data.alias)
    .bind(&data.tag_ids)
    .bind(data.category_id)
    .fetch_optional(db)
    .await?;
    Ok(post)
}

pub async fn delete_post(db: &PgPool, post_id: i64) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Load the persisted view counter, add one, commit. Its own unit of work;
/// concurrent readers of the same post can lose updates (accepted, see
/// DESIGN.md).
pub async fn add_view(db: &PgPool, post_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT view_count FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE posts SET view_count = $1 WHERE id = $2")
        .bind(current + 1)
        .bind(post_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Same shape as [`add_view`], for the denormalized comment counter.
pub async fn add_comment(db: &PgPool, post_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT comment_count FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE posts SET comment_count = $1 WHERE id = $2")
        .bind(current + 1)
        .bind(post_id)
        .execute(db)
        .await?;
    Ok(())
}
