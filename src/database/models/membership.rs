use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Join record placing one card in one collection
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CollectionForCard {
    pub id: Uuid,
    #[serde(rename = "tradingCard")]
    pub trading_card_id: Uuid,
    #[serde(rename = "cardCollection")]
    pub card_collection_id: Uuid,
    pub created_at: DateTime<Utc>,
}
