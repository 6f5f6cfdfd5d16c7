use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CardCollection {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Collection joined to its owner's username
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWithOwner {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub owner_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScoredCollection {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub collection: CollectionWithOwner,
    pub score: f32,
}

impl CardCollection {
    /// The collection provisioned at signup carries its owner's username as title
    pub fn is_main_for(&self, username: &str) -> bool {
        self.title == username
    }
}
