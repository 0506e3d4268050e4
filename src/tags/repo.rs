use serde::Deserialize;
use sqlx::PgPool;

use super::model::Tag;

#[derive(Debug, Deserialize)]
pub struct CreateTagData {
    pub name: String,
    pub order: i32,
    pub alias: Option<String>,
    pub intro: Option<String>,
    pub template: Option<String>,
    pub meta: Option<String>,
}

pub async fn create_tag(db: &PgPool, data: CreateTagData) -> anyhow::Result<Tag> {
    let tag = sqlx::query_as::<_, Tag>(
        r#"
        INSERT INTO tags (name, tag_order, alias, intro, template, meta)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, tag_order, post_count, alias, intro, template, meta
        "#,
    )
    .bind(&data.name)
    .bind(data.order)
    .bind(&data.alias)
    .bind(&data.intro)
    .bind(&data.template)
    .bind(&data.meta)
    .fetch_one(db)
    .await?;
    Ok(tag)
}

pub async fn get_tag_by_id(db: &PgPool, tag_id: i64) -> anyhow::Result<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>(
        r#"
        SELECT id, name, tag_order, post_count, alias, intro, template, meta
        FROM tags
        WHERE id = $1
        "#,
    )
    .bind(tag_id)
    .fetch_optional(db)
    .await?;
    Ok(tag)
}

pub async fn list_tags(db: &PgPool) -> anyhow::Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT id, name, tag_order, post_count, alias, intro, template, meta
        FROM tags
        ORDER BY tag_order ASC, id ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(tags)
}

/// Load-then-store counter bump, same as the category repo.
pub async fn add_post(db: &PgPool, tag_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT post_count FROM tags WHERE id = $1")
        .bind(tag_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE tags SET post_count = $1 WHERE id = $2")
        .bind(current + 1)
        .bind(tag_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn remove_post(db: &PgPool, tag_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT post_count FROM tags WHERE id = $1")
        .bind(tag_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE tags SET post_count = $1 WHERE id = $2")
        .bind((current - 1).max(0))
        .bind(tag_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_tag(db: &PgPool, tag_id: i64) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(tag_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
