//! Seeding utilities for the shared demo collection.
//!
//! Reset clones the seed users' main-collection cards into the demo owner's
//! main collection. Clones carry a marker suffix on their certification
//! number so they never collide with the originals and can be purged later.

use std::collections::HashSet;

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DemoConfig;
use crate::database::models::{NewCard, TradingCard};
use crate::database::{DataError, DataResult};
use crate::services::card_service::{self, CARD_COLUMNS};
use crate::services::collection_service;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoReset {
    pub collection_id: Uuid,
    pub removed_cards: u64,
    pub copied_cards: u64,
}

pub struct DemoService {
    pool: PgPool,
    config: DemoConfig,
}

impl DemoService {
    pub fn new(pool: PgPool, config: DemoConfig) -> Self {
        Self { pool, config }
    }

    /// Purge earlier demo copies, then clone every seed user's main collection into the demo collection
    pub async fn reset_demo_collection(&self) -> DataResult<DemoReset> {
        if self.config.cert_marker.is_empty() {
            return Err(DataError::invalid("demo certification marker must not be empty"));
        }

        let mut tx = self.pool.begin().await?;
        let removed_cards = self.purge_marked(&mut tx).await?;

        let owner: Option<(Uuid, String)> = sqlx::query_as("SELECT id, username FROM users WHERE username = $1")
            .bind(&self.config.owner)
            .fetch_optional(&mut *tx)
            .await?;
        let (owner_id, owner_name) = owner.ok_or_else(|| DataError::not_found("did not find demo user"))?;

        let demo_collection = match collection_service::find_by_owner_and_title(&mut *tx, owner_id, &owner_name).await? {
            Some(collection) => collection,
            None => collection_service::insert_collection(&mut *tx, &owner_name, owner_id).await?,
        };

        let mut copied = HashSet::new();
        for seed_user in &self.config.seed_users {
            let sql = format!(
                "SELECT {} FROM users u \
                 JOIN card_collections cc ON cc.owner_id = u.id AND cc.title = u.username \
                 JOIN collection_for_card m ON m.card_collection_id = cc.id \
                 JOIN trading_cards c ON c.id = m.trading_card_id \
                 WHERE u.username = $1 \
                 ORDER BY m.seq",
                CARD_COLUMNS
            );
            let cards = sqlx::query_as::<_, TradingCard>(&sql)
                .bind(seed_user)
                .fetch_all(&mut *tx)
                .await?;
            if cards.is_empty() {
                warn!("Demo seed user {} has no cards", seed_user);
            }

            for card in cards {
                if !copied.insert(card.id) {
                    continue;
                }
                let marked_cert = format!("{}{}", card.certification_number, self.config.cert_marker);
                let copy = card_service::insert_card(&mut *tx, &NewCard::from(card), Some(&marked_cert)).await?;
                collection_service::insert_membership(&mut *tx, demo_collection.id, copy.id).await?;
            }
        }

        tx.commit().await?;

        let copied_cards = copied.len() as u64;
        info!(
            "Reset demo collection {}: removed {} cards, copied {} cards",
            demo_collection.id, removed_cards, copied_cards
        );
        Ok(DemoReset {
            collection_id: demo_collection.id,
            removed_cards,
            copied_cards,
        })
    }

    /// Delete every marked card and its memberships; returns the number of cards removed
    pub async fn remove_demo_collection(&self) -> DataResult<u64> {
        if self.config.cert_marker.is_empty() {
            return Err(DataError::invalid("demo certification marker must not be empty"));
        }

        let mut tx = self.pool.begin().await?;
        let removed = self.purge_marked(&mut tx).await?;
        tx.commit().await?;

        info!("Removed {} demo cards", removed);
        Ok(removed)
    }

    async fn purge_marked(&self, tx: &mut sqlx::PgConnection) -> DataResult<u64> {
        let card_ids: Vec<Uuid> = sqlx::query_as::<_, (Uuid,)>(
            "SELECT id FROM trading_cards WHERE right(certification_number, char_length($1)) = $1",
        )
        .bind(&self.config.cert_marker)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(id,)| id)
        .collect();

        card_service::delete_cards_cascade(tx, &card_ids).await
    }
}
