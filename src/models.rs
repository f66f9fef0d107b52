use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Titles longer than this are rejected at the storage layer.
pub const MAX_TITLE_LEN: usize = 60;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of POST and PUT requests.
///
/// Fields default to empty on deserialization so a missing field takes the
/// same 400 "Missing required fields" path as an empty one, instead of being
/// rejected by the JSON extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl PostPayload {
    /// Handler-layer validation; the storage layer re-checks independently.
    pub fn has_required_fields(&self) -> bool {
        !self.title.is_empty() && !self.content.is_empty() && !self.author.is_empty()
    }
}

// Confirmation body for DELETE
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
