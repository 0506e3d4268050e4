use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Metadata of an uploaded file. The bytes themselves live wherever the
/// surrounding application stores them; `stored_name` is the key into that
/// store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Upload {
    pub id: i64,
    pub author_id: i64,
    pub size: i64,
    pub stored_name: String,
    pub source_name: String,
    pub mime_type: String,
    pub uploaded_at: OffsetDateTime,
}
