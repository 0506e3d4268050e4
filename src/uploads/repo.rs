use serde::Deserialize;
use sqlx::PgPool;

use super::model::Upload;

#[derive(Debug, Deserialize)]
pub struct CreateUploadData {
    pub author_id: i64,
    pub size: i64,
    pub stored_name: String,
    pub source_name: String,
    pub mime_type: String,
}

pub async fn record_upload(db: &PgPool, data: CreateUploadData) -> anyhow::Result<Upload> {
    let upload = sqlx::query_as::<_, Upload>(
        r#"
        INSERT INTO uploads (author_id, size, stored_name, source_name, mime_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, author_id, size, stored_name, source_name, mime_type, uploaded_at
        "#,
    )
    .bind(data.author_id)
    .bind(data.size)
    .bind(&data.stored_name)
    .bind(&data.source_name)
    .bind(&data.mime_type)
    .fetch_one(db)
    .await?;
    Ok(upload)
}

pub async fn get_upload_by_id(db: &PgPool, upload_id: i64) -> anyhow::Result<Option<Upload>> {
    let upload = sqlx::query_as::<_, Upload>(
        r#"
        SELECT id, author_id, size, stored_name, source_name, mime_type, uploaded_at
        FROM uploads
        WHERE id = $1
        "#,
    )
    .bind(upload_id)
    .fetch_optional(db)
    .await?;
    Ok(upload)
}

pub async fn list_by_account(
    db: &PgPool,
    author_id: i64,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Upload>> {
    let uploads = sqlx::query_as::<_, Upload>(
        r#"
        SELECT id, author_id, size, stored_name, source_name, mime_type, uploaded_at
        FROM uploads
        WHERE author_id = $1
        ORDER BY uploaded_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(uploads)
}

pub async fn delete_upload(db: &PgPool, upload_id: i64) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM uploads WHERE id = $1")
        .bind(upload_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
