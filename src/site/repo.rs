use sqlx::PgPool;
use tracing::info;

use super::model::BlogInfo;

/// The singleton row, if the site has been initialized.
pub async fn get(db: &PgPool) -> anyhow::Result<Option<BlogInfo>> {
    let info = sqlx::query_as::<_, BlogInfo>(
        r#"
        SELECT id, title, keywords, description, logo, analytics_code,
               case_number, views
        FROM blog_info
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(db)
    .await?;
    Ok(info)
}

/// Insert a starter row when none exists yet. Safe to call on every boot.
pub async fn ensure_default(db: &PgPool) -> anyhow::Result<BlogInfo> {
    if let Some(existing) = get(db).await? {
        return Ok(existing);
    }
    let info = sqlx::query_as::<_, BlogInfo>(
        r#"
        INSERT INTO blog_info (title, keywords, description, views)
        VALUES ($1, $2, $3, 0)
        RETURNING id, title, keywords, description, logo, analytics_code,
                  case_number, views
        "#,
    )
    .bind("My Blog")
    .bind("blog")
    .bind("A personal blog")
    .fetch_one(db)
    .await?;
    info!(blog_info_id = info.id, "site info row created");
    Ok(info)
}

pub async fn update(db: &PgPool, info: &BlogInfo) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE blog_info
        SET title = $2, keywords = $3, description = $4, logo = $5,
            analytics_code = $6, case_number = $7
        WHERE id = $1
        "#,
    )
    .bind(info.id)
    .bind(&info.title)
    .bind(&info.keywords)
    .bind(&info.description)
    .bind(&info.logo)
    .bind(&info.analytics_code)
    .bind(&info.case_number)
    .execute(db)
    .await?;
    Ok(())
}

/// Global view counter: load the first row's value, add one, commit.
/// Same accepted race as the post counters (DESIGN.md).
pub async fn add_view(db: &PgPool) -> anyhow::Result<()> {
    let row = sqlx::query_as::<_, (i64, i32)>(
        "SELECT id, views FROM blog_info ORDER BY id ASC LIMIT 1",
    )
    .fetch_optional(db)
    .await?;
    let Some((id, views)) = row else {
        // Nothing to count against until the site row is seeded.
        return Ok(());
    };
    sqlx::query("UPDATE blog_info SET views = $1 WHERE id = $2")
        .bind(views + 1)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
