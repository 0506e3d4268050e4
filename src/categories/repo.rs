use serde::Deserialize;
use sqlx::PgPool;

use super::model::Category;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryData {
    pub name: String,
    pub order: i32,
    pub alias: Option<String>,
    pub intro: Option<String>,
    pub root_id: Option<i64>,
    pub parent_id: Option<i64>,
}

pub async fn create_category(db: &PgPool, data: CreateCategoryData) -> anyhow::Result<Category> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, category_order, alias, intro, root_id, parent_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, category_order, post_count, alias, intro, root_id, parent_id
        "#,
    )
    .bind(&data.name)
    .bind(data.order)
    .bind(&data.alias)
    .bind(&data.intro)
    .bind(data.root_id)
    .bind(data.parent_id)
    .fetch_one(db)
    .await?;
    Ok(category)
}

pub async fn get_category_by_id(db: &PgPool, category_id: i64) -> anyhow::Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, category_order, post_count, alias, intro, root_id, parent_id
        FROM categories
        WHERE id = $1
        "#,
    )
    .bind(category_id)
    .fetch_optional(db)
    .await?;
    Ok(category)
}

pub async fn list_categories(db: &PgPool) -> anyhow::Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, category_order, post_count, alias, intro, root_id, parent_id
        FROM categories
        ORDER BY category_order ASC, id ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(categories)
}

/// Bump the denormalized post count. Load-then-store on purpose (see
/// DESIGN.md on counter atomicity).
pub async fn add_post(db: &PgPool, category_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT post_count FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE categories SET post_count = $1 WHERE id = $2")
        .bind(current + 1)
        .bind(category_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Counterpart of [`add_post`]; never drops below zero.
pub async fn remove_post(db: &PgPool, category_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT post_count FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE categories SET post_count = $1 WHERE id = $2")
        .bind((current - 1).max(0))
        .bind(category_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_category(db: &PgPool, category_id: i64) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
