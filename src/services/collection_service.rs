use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::{
    CardCollection, CollectionForCard, CollectionWithOwner, ScoredCard, ScoredCollection, TradingCard,
};
use crate::database::search::text_query;
use crate::database::sort::{order_clause, CardSort, SortDirection};
use crate::database::{parse_id, DataError, DataResult};
use crate::services::access::Requester;
use crate::services::card_service::CARD_COLUMNS;

const COLLECTION_COLUMNS: &str = "cc.id, cc.title, cc.owner_id, cc.created_at";

pub struct CollectionService {
    pool: PgPool,
}

impl CollectionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_card_collection(&self, title: &str, owner_id: Uuid) -> DataResult<CardCollection> {
        let collection = insert_collection(&self.pool, title, owner_id).await?;
        info!("Created card collection {} '{}' for owner {}", collection.id, collection.title, owner_id);
        Ok(collection)
    }

    pub async fn add_card_to_collection(
        &self,
        collection_id: &str,
        card_id: &str,
        requester: &Requester,
    ) -> DataResult<CollectionForCard> {
        let collection_id = parse_id(collection_id, "card collection")?;
        let card_id = parse_id(card_id, "card")?;

        self.authorize_write(collection_id, requester).await?;
        let membership = insert_membership(&self.pool, collection_id, card_id).await?;

        info!("Added card {} to collection {}", card_id, collection_id);
        Ok(membership)
    }

    /// Returns the number of memberships removed (zero or one)
    pub async fn remove_card_from_collection(&self, card_id: &str, collection_id: &str) -> DataResult<u64> {
        let collection_id = parse_id(collection_id, "card collection")?;
        let card_id = parse_id(card_id, "card")?;

        let result = sqlx::query(
            "DELETE FROM collection_for_card WHERE card_collection_id = $1 AND trading_card_id = $2",
        )
        .bind(collection_id)
        .bind(card_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Rename a collection.
    ///
    /// Owners may rename their collections except the main one (titled after
    /// the requester); admins may rename anything.
    pub async fn update_card_collection_title(
        &self,
        collection_id: &str,
        requester: &Requester,
        title: &str,
    ) -> DataResult<CardCollection> {
        let collection_id = parse_id(collection_id, "card collection")?;
        let title = required_title(title)?;

        let collection = find_collection(&self.pool, collection_id)
            .await?
            .ok_or_else(|| DataError::not_found("did not find card collection"))?;

        let owner_may_rename = collection.owner_id == requester.id && !collection.is_main_for(&requester.username);
        if !(owner_may_rename || requester.is_admin()) {
            debug!("Denied rename of collection {} to {}", collection_id, requester.username);
            return Err(DataError::no_write_permission(
                "user does not have write permissions for this collection",
            ));
        }

        let sql = format!(
            "UPDATE card_collections cc SET title = $2 WHERE cc.id = $1 RETURNING {}",
            COLLECTION_COLUMNS
        );
        let updated = sqlx::query_as::<_, CardCollection>(&sql)
            .bind(collection_id)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DataError::not_found("did not find card collection"))?;

        info!("Renamed collection {} to '{}'", updated.id, updated.title);
        Ok(updated)
    }

    pub async fn get_card_collection(&self, collection_id: &str) -> DataResult<Option<CardCollection>> {
        let collection_id = parse_id(collection_id, "card collection")?;
        find_collection(&self.pool, collection_id).await
    }

    /// Every collection with its owner's name, ordered by owner then title
    pub async fn get_all_card_collections(&self) -> DataResult<Vec<CollectionWithOwner>> {
        Ok(sqlx::query_as::<_, CollectionWithOwner>(
            "SELECT cc.id, cc.title, cc.owner_id, u.username AS owner_name \
             FROM card_collections cc \
             JOIN users u ON u.id = cc.owner_id \
             ORDER BY u.username, cc.title",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// `Ok(None)` when no user has that name
    pub async fn get_card_collections_for_user(&self, owner_name: &str) -> DataResult<Option<Vec<CardCollection>>> {
        let Some(owner_id) = user_id_by_name(&self.pool, owner_name).await? else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {} FROM card_collections cc WHERE cc.owner_id = $1 ORDER BY cc.created_at, cc.title",
            COLLECTION_COLUMNS
        );
        let collections = sqlx::query_as::<_, CardCollection>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(Some(collections))
    }

    pub async fn get_collection_by_owner_and_title(&self, title: &str, owner_name: &str) -> DataResult<CardCollection> {
        let sql = format!(
            "SELECT {} FROM card_collections cc \
             JOIN users u ON u.id = cc.owner_id \
             WHERE u.username = $1 AND cc.title = $2",
            COLLECTION_COLUMNS
        );
        sqlx::query_as::<_, CardCollection>(&sql)
            .bind(owner_name)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DataError::not_found("did not find card collection"))
    }

    /// Cards linked to the collection, flattened, in the requested order
    pub async fn get_cards_in_collection(
        &self,
        collection_id: &str,
        sort: Option<CardSort>,
        direction: SortDirection,
    ) -> DataResult<Vec<TradingCard>> {
        let collection_id = parse_id(collection_id, "card collection")?;

        let sql = format!(
            "SELECT {} FROM collection_for_card m \
             JOIN trading_cards c ON c.id = m.trading_card_id \
             WHERE m.card_collection_id = $1 {}",
            CARD_COLUMNS,
            order_clause("c", sort, direction, "m.seq")
        );
        Ok(sqlx::query_as::<_, TradingCard>(&sql)
            .bind(collection_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn count_cards_in_collection(&self, collection_id: &str) -> DataResult<i64> {
        let collection_id = parse_id(collection_id, "card collection")?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM collection_for_card WHERE card_collection_id = $1")
            .bind(collection_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_collections_for_user(&self, user_id: Uuid) -> DataResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM card_collections WHERE owner_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Reverse lookup: every collection holding the card
    pub async fn get_collections_for_card(&self, card_id: &str) -> DataResult<Vec<CardCollection>> {
        let card_id = parse_id(card_id, "card")?;
        let sql = format!(
            "SELECT {} FROM collection_for_card m \
             JOIN card_collections cc ON cc.id = m.card_collection_id \
             WHERE m.trading_card_id = $1 \
             ORDER BY m.seq",
            COLLECTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, CardCollection>(&sql)
            .bind(card_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn search_for_card_in_collection(&self, collection_id: &str, query: &str) -> DataResult<Vec<ScoredCard>> {
        let collection_id = parse_id(collection_id, "card collection")?;
        let Some(ts_query) = text_query(query) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT {}, ts_rank(c.search_vector, q.query) AS score \
             FROM trading_cards c \
             JOIN collection_for_card m ON m.trading_card_id = c.id \
             CROSS JOIN to_tsquery('simple', $1) AS q(query) \
             WHERE m.card_collection_id = $2 AND c.search_vector @@ q.query \
             ORDER BY score DESC, c.id",
            CARD_COLUMNS
        );
        Ok(sqlx::query_as::<_, ScoredCard>(&sql)
            .bind(ts_query)
            .bind(collection_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn search_collections(&self, query: &str) -> DataResult<Vec<ScoredCollection>> {
        let Some(ts_query) = text_query(query) else {
            return Ok(Vec::new());
        };

        Ok(sqlx::query_as::<_, ScoredCollection>(
            "SELECT cc.id, cc.title, cc.owner_id, u.username AS owner_name, \
                    ts_rank(cc.search_vector, q.query) AS score \
             FROM card_collections cc \
             JOIN users u ON u.id = cc.owner_id \
             CROSS JOIN to_tsquery('simple', $1) AS q(query) \
             WHERE cc.search_vector @@ q.query \
             ORDER BY score DESC, cc.id",
        )
        .bind(ts_query)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Delete memberships of the collection, then the collection, atomically
    pub async fn remove_card_collection(&self, collection_id: &str) -> DataResult<u64> {
        let collection_id = parse_id(collection_id, "card collection")?;

        let mut tx = self.pool.begin().await?;
        let deleted = delete_collections_cascade(&mut tx, &[collection_id]).await?;
        tx.commit().await?;

        if deleted > 0 {
            info!("Deleted card collection {}", collection_id);
        }
        Ok(deleted)
    }

    /// Permission-checked delete that refuses to remove a user's main collection
    pub async fn remove_card_collection_as(&self, collection_id: &str, requester: &Requester) -> DataResult<u64> {
        let id = parse_id(collection_id, "card collection")?;

        let collection = sqlx::query_as::<_, CollectionWithOwner>(
            "SELECT cc.id, cc.title, cc.owner_id, u.username AS owner_name \
             FROM card_collections cc \
             JOIN users u ON u.id = cc.owner_id \
             WHERE cc.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DataError::not_found("did not find card collection"))?;

        if !requester.may_write(collection.owner_id) {
            debug!("Denied delete of collection {} to {}", id, requester.username);
            return Err(DataError::no_write_permission(
                "user does not have write permissions for this collection",
            ));
        }
        if collection.title == collection.owner_name {
            return Err(DataError::protected("cannot delete the main collection of a user"));
        }

        self.remove_card_collection(collection_id).await
    }

    /// Load the collection and require that the requester owns it or is an admin
    pub async fn authorize_read(&self, collection_id: &str, requester: &Requester) -> DataResult<CardCollection> {
        let collection_id = parse_id(collection_id, "card collection")?;
        let collection = find_collection(&self.pool, collection_id)
            .await?
            .ok_or_else(|| DataError::not_found("did not find card collection"))?;

        if requester.may_write(collection.owner_id) {
            Ok(collection)
        } else {
            debug!("Denied read of collection {} to {}", collection_id, requester.username);
            Err(DataError::no_read_permission(
                "user does not have read permissions for this collection",
            ))
        }
    }

    /// Load the collection and require that the requester may change it
    pub async fn authorize_write(&self, collection_id: Uuid, requester: &Requester) -> DataResult<CardCollection> {
        let collection = find_collection(&self.pool, collection_id)
            .await?
            .ok_or_else(|| DataError::not_found("did not find card collection"))?;

        if requester.may_write(collection.owner_id) {
            Ok(collection)
        } else {
            debug!("Denied write of collection {} to {}", collection_id, requester.username);
            Err(DataError::no_write_permission(
                "user does not have write permissions for this collection",
            ))
        }
    }
}

fn required_title(title: &str) -> DataResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        Err(DataError::invalid("card collection validation failed: title required"))
    } else {
        Ok(title)
    }
}

pub(crate) async fn insert_collection<'e, E: PgExecutor<'e>>(
    executor: E,
    title: &str,
    owner_id: Uuid,
) -> DataResult<CardCollection> {
    let title = required_title(title)?;
    let sql = format!(
        "INSERT INTO card_collections AS cc (id, title, owner_id) VALUES ($1, $2, $3) RETURNING {}",
        COLLECTION_COLUMNS
    );
    Ok(sqlx::query_as::<_, CardCollection>(&sql)
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(owner_id)
        .fetch_one(executor)
        .await?)
}

pub(crate) async fn insert_membership<'e, E: PgExecutor<'e>>(
    executor: E,
    collection_id: Uuid,
    card_id: Uuid,
) -> DataResult<CollectionForCard> {
    Ok(sqlx::query_as::<_, CollectionForCard>(
        "INSERT INTO collection_for_card (id, trading_card_id, card_collection_id) \
         VALUES ($1, $2, $3) \
         RETURNING id, trading_card_id, card_collection_id, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(card_id)
    .bind(collection_id)
    .fetch_one(executor)
    .await?)
}

pub(crate) async fn find_collection<'e, E: PgExecutor<'e>>(
    executor: E,
    collection_id: Uuid,
) -> DataResult<Option<CardCollection>> {
    let sql = format!("SELECT {} FROM card_collections cc WHERE cc.id = $1", COLLECTION_COLUMNS);
    Ok(sqlx::query_as::<_, CardCollection>(&sql)
        .bind(collection_id)
        .fetch_optional(executor)
        .await?)
}

pub(crate) async fn find_by_owner_and_title<'e, E: PgExecutor<'e>>(
    executor: E,
    owner_id: Uuid,
    title: &str,
) -> DataResult<Option<CardCollection>> {
    let sql = format!(
        "SELECT {} FROM card_collections cc WHERE cc.owner_id = $1 AND cc.title = $2",
        COLLECTION_COLUMNS
    );
    Ok(sqlx::query_as::<_, CardCollection>(&sql)
        .bind(owner_id)
        .bind(title)
        .fetch_optional(executor)
        .await?)
}

async fn user_id_by_name<'e, E: PgExecutor<'e>>(executor: E, username: &str) -> DataResult<Option<Uuid>> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|(id,)| id))
}

/// Remove memberships for the collections, then the collections themselves
pub(crate) async fn delete_collections_cascade(tx: &mut sqlx::PgConnection, collection_ids: &[Uuid]) -> DataResult<u64> {
    if collection_ids.is_empty() {
        return Ok(0);
    }

    sqlx::query("DELETE FROM collection_for_card WHERE card_collection_id = ANY($1)")
        .bind(collection_ids)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM card_collections WHERE id = ANY($1)")
        .bind(collection_ids)
        .execute(&mut *tx)
        .await?;

    Ok(result.rows_affected())
}
