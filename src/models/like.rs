use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'likes' table in the database.
///
/// At most one row per (user_id, post_id) and per (ip_address, post_id).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    pub user_id: Option<String>,
    pub post_id: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Who is liking: an authenticated user, an anonymous origin, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeIdentity {
    pub user_id: Option<String>,
    pub ip: Option<String>,
}

impl LikeIdentity {
    pub fn is_unidentified(&self) -> bool {
        self.user_id.is_none() && self.ip.is_none()
    }
}
