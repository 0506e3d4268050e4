use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Site-wide metadata. Singleton by convention: the repo always works on
/// the first row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogInfo {
    pub id: i64,
    pub title: String,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub analytics_code: Option<String>,
    pub case_number: Option<String>,
    pub views: i32,
}
