use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::{CardPatch, NewCard, ScoredCard, TradingCard};
use crate::database::search::text_query;
use crate::database::{parse_id, DataError, DataResult};
use crate::services::access::Requester;
use crate::services::collection_service;

/// Card columns, qualified with the `c` alias
pub(crate) const CARD_COLUMNS: &str = "c.id, c.year, c.brand, c.card_number, c.card_set, c.subject, \
     c.variety, c.grading_company, c.grade, c.certification_number, \
     c.front_card_image_link, c.back_card_image_link, c.sold, c.created_at";

pub struct CardService {
    pool: PgPool,
}

impl CardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_card(&self, card: &NewCard) -> DataResult<TradingCard> {
        card.validate()?;
        let created = insert_card(&self.pool, card, None).await?;
        info!("Created trading card {} ({} {})", created.id, created.grading_company, created.certification_number);
        Ok(created)
    }

    /// Insert a card and link it into the requester's main collection in one transaction
    pub async fn create_card_in_main_collection(&self, card: &NewCard, requester: &Requester) -> DataResult<TradingCard> {
        card.validate()?;

        let mut tx = self.pool.begin().await?;
        let created = insert_card(&mut *tx, card, None).await?;

        let main = collection_service::find_by_owner_and_title(&mut *tx, requester.id, &requester.username)
            .await?
            .ok_or_else(|| DataError::not_found("did not find card collection"))?;
        collection_service::insert_membership(&mut *tx, main.id, created.id).await?;

        tx.commit().await?;
        info!("Created trading card {} in main collection of {}", created.id, requester.username);
        Ok(created)
    }

    /// Admins read any card; everyone else must own the card's collection
    pub async fn get_card(&self, card_id: &str, requester: &Requester) -> DataResult<Option<TradingCard>> {
        let card_id = parse_id(card_id, "trading card")?;

        let Some(card) = find_card(&self.pool, card_id).await? else {
            return Ok(None);
        };
        if requester.is_admin() {
            return Ok(Some(card));
        }

        match card_owner(&self.pool, card_id).await? {
            Some(owner_id) if owner_id == requester.id => Ok(Some(card)),
            _ => {
                debug!("Denied read of card {} to {}", card_id, requester.username);
                Err(DataError::no_read_permission("user does not have read permissions for card"))
            }
        }
    }

    pub async fn get_all_cards(&self) -> DataResult<Vec<TradingCard>> {
        let sql = format!("SELECT {} FROM trading_cards c ORDER BY c.created_at, c.id", CARD_COLUMNS);
        Ok(sqlx::query_as::<_, TradingCard>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn get_card_by_cert(&self, grading_company: &str, certification_number: &str) -> DataResult<Option<TradingCard>> {
        let sql = format!(
            "SELECT {} FROM trading_cards c WHERE c.grading_company = $1 AND c.certification_number = $2",
            CARD_COLUMNS
        );
        Ok(sqlx::query_as::<_, TradingCard>(&sql)
            .bind(grading_company)
            .bind(certification_number)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Apply a partial update; `Ok(None)` when the card does not exist
    pub async fn update_card(&self, card_id: &str, patch: &CardPatch, requester: &Requester) -> DataResult<Option<TradingCard>> {
        let card_id = parse_id(card_id, "trading card")?;
        patch.validate()?;

        if !requester.is_admin() {
            if find_card(&self.pool, card_id).await?.is_none() {
                return Ok(None);
            }
            self.ensure_card_writer(card_id, requester).await?;
        }

        let sql = format!(
            "UPDATE trading_cards c SET \
                year = COALESCE($2, c.year), \
                brand = COALESCE($3, c.brand), \
                card_number = COALESCE($4, c.card_number), \
                card_set = COALESCE($5, c.card_set), \
                subject = COALESCE($6, c.subject), \
                variety = COALESCE($7, c.variety), \
                grading_company = COALESCE($8, c.grading_company), \
                grade = COALESCE($9, c.grade), \
                certification_number = COALESCE($10, c.certification_number), \
                front_card_image_link = COALESCE($11, c.front_card_image_link), \
                back_card_image_link = COALESCE($12, c.back_card_image_link), \
                sold = COALESCE($13, c.sold) \
             WHERE c.id = $1 RETURNING {}",
            CARD_COLUMNS
        );

        let updated = sqlx::query_as::<_, TradingCard>(&sql)
            .bind(card_id)
            .bind(patch.year)
            .bind(&patch.brand)
            .bind(&patch.card_number)
            .bind(&patch.card_set)
            .bind(&patch.subject)
            .bind(&patch.variety)
            .bind(&patch.grading_company)
            .bind(&patch.grade)
            .bind(&patch.certification_number)
            .bind(&patch.front_card_image_link)
            .bind(&patch.back_card_image_link)
            .bind(patch.sold)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(card) = &updated {
            info!("Updated trading card {} for {}", card.id, requester.username);
        }
        Ok(updated)
    }

    /// Delete a card and every membership referencing it; returns rows removed from trading_cards
    pub async fn delete_card(&self, card_id: &str, requester: &Requester) -> DataResult<u64> {
        let card_id = parse_id(card_id, "trading card")?;

        if !requester.is_admin() {
            if find_card(&self.pool, card_id).await?.is_none() {
                return Ok(0);
            }
            self.ensure_card_writer(card_id, requester).await?;
        }

        let mut tx = self.pool.begin().await?;
        let deleted = delete_cards_cascade(&mut tx, &[card_id]).await?;
        tx.commit().await?;

        if deleted > 0 {
            info!("Deleted trading card {} for {}", card_id, requester.username);
        }
        Ok(deleted)
    }

    /// Full-text search across every card, most relevant first
    pub async fn search(&self, query: &str) -> DataResult<Vec<ScoredCard>> {
        let Some(ts_query) = text_query(query) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT {}, ts_rank(c.search_vector, q.query) AS score \
             FROM trading_cards c, to_tsquery('simple', $1) AS q(query) \
             WHERE c.search_vector @@ q.query \
             ORDER BY score DESC, c.id",
            CARD_COLUMNS
        );
        Ok(sqlx::query_as::<_, ScoredCard>(&sql)
            .bind(ts_query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn ensure_card_writer(&self, card_id: Uuid, requester: &Requester) -> DataResult<()> {
        match card_owner(&self.pool, card_id).await? {
            Some(owner_id) if requester.may_write(owner_id) => Ok(()),
            _ => {
                debug!("Denied write of card {} to {}", card_id, requester.username);
                Err(DataError::no_write_permission("user does not have write permissions for card"))
            }
        }
    }
}

pub(crate) async fn insert_card<'e, E: PgExecutor<'e>>(
    executor: E,
    card: &NewCard,
    cert_override: Option<&str>,
) -> DataResult<TradingCard> {
    let sql = format!(
        "INSERT INTO trading_cards AS c (id, year, brand, card_number, card_set, subject, variety, \
            grading_company, grade, certification_number, front_card_image_link, back_card_image_link, sold) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING {}",
        CARD_COLUMNS
    );

    Ok(sqlx::query_as::<_, TradingCard>(&sql)
        .bind(Uuid::new_v4())
        .bind(card.year)
        .bind(&card.brand)
        .bind(&card.card_number)
        .bind(&card.card_set)
        .bind(&card.subject)
        .bind(&card.variety)
        .bind(&card.grading_company)
        .bind(&card.grade)
        .bind(cert_override.unwrap_or(card.certification_number.as_str()))
        .bind(&card.front_card_image_link)
        .bind(&card.back_card_image_link)
        .bind(card.sold)
        .fetch_one(executor)
        .await?)
}

pub(crate) async fn find_card<'e, E: PgExecutor<'e>>(executor: E, card_id: Uuid) -> DataResult<Option<TradingCard>> {
    let sql = format!("SELECT {} FROM trading_cards c WHERE c.id = $1", CARD_COLUMNS);
    Ok(sqlx::query_as::<_, TradingCard>(&sql)
        .bind(card_id)
        .fetch_optional(executor)
        .await?)
}

/// Owner of the collection holding the card's earliest membership
pub(crate) async fn card_owner<'e, E: PgExecutor<'e>>(executor: E, card_id: Uuid) -> DataResult<Option<Uuid>> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT cc.owner_id \
         FROM collection_for_card m \
         JOIN card_collections cc ON cc.id = m.card_collection_id \
         WHERE m.trading_card_id = $1 \
         ORDER BY m.seq \
         LIMIT 1",
    )
    .bind(card_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(owner_id,)| owner_id))
}

/// Remove memberships for the cards, then the cards themselves
pub(crate) async fn delete_cards_cascade(tx: &mut sqlx::PgConnection, card_ids: &[Uuid]) -> DataResult<u64> {
    if card_ids.is_empty() {
        return Ok(0);
    }

    sqlx::query("DELETE FROM collection_for_card WHERE trading_card_id = ANY($1)")
        .bind(card_ids)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM trading_cards WHERE id = ANY($1)")
        .bind(card_ids)
        .execute(&mut *tx)
        .await?;

    Ok(result.rows_affected())
}
