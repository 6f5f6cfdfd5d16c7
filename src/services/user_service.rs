use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{CardCollection, NewUser, User};
use crate::database::{parse_id, DataError, DataResult};
use crate::services::{card_service, collection_service};

const USER_COLUMNS: &str = "id, username, email, password, roles, created_at";

/// A freshly created user together with the main collection provisioned for them
#[derive(Debug, Clone, Serialize)]
pub struct SignupResult {
    pub user: User,
    pub collection: CardCollection,
}

/// Counts of what an account deletion removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRemoval {
    pub deleted_cards: u64,
    pub deleted_collections: u64,
    pub deleted_users: u64,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user and their main collection (titled with the username) atomically
    pub async fn create_user(&self, new_user: &NewUser) -> DataResult<SignupResult> {
        let username = new_user.username.trim();
        if username.is_empty() {
            return Err(DataError::invalid("user validation failed: username required"));
        }
        if new_user.password.is_empty() {
            return Err(DataError::invalid("user validation failed: password required"));
        }

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO users (id, username, email, password, roles) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(new_user.email.as_deref().map(str::trim))
            .bind(&new_user.password)
            .bind(&new_user.roles)
            .fetch_one(&mut *tx)
            .await?;

        let collection = collection_service::insert_collection(&mut *tx, &user.username, user.id).await?;
        tx.commit().await?;

        info!("Created user {} with main collection {}", user.username, collection.id);
        Ok(SignupResult { user, collection })
    }

    pub async fn get_user(&self, username: &str) -> DataResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> DataResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Directory listing of usernames
    pub async fn get_all_users(&self) -> DataResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT username FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Replace the stored hash; `Ok(false)` when no user has that id
    pub async fn update_user_password(&self, user_id: &str, password_hash: &str) -> DataResult<bool> {
        let user_id = parse_id(user_id, "user")?;
        let result = sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Updated password for user {}", user_id);
        }
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_user_roles(&self, username: &str, roles: &[String]) -> DataResult<Option<User>> {
        if roles.is_empty() {
            return Err(DataError::invalid("user validation failed: at least one role required"));
        }

        let sql = format!("UPDATE users SET roles = $2 WHERE username = $1 RETURNING {}", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(roles)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(user) = &user {
            info!("Set roles of {} to {:?}", user.username, user.roles);
        }
        Ok(user)
    }

    /// Remove only the user row
    pub async fn delete_user(&self, user_id: &str) -> DataResult<u64> {
        let user_id = parse_id(user_id, "user")?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete-account flow: the user's cards, memberships and collections, then the user
    pub async fn delete_account(&self, user_id: &str) -> DataResult<AccountRemoval> {
        let user_id = parse_id(user_id, "user")?;
        let mut tx = self.pool.begin().await?;

        let collection_ids: Vec<Uuid> = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM card_collections WHERE owner_id = $1")
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|(id,)| id)
            .collect();

        let card_ids: Vec<Uuid> = sqlx::query_as::<_, (Uuid,)>(
            "SELECT DISTINCT trading_card_id FROM collection_for_card WHERE card_collection_id = ANY($1)",
        )
        .bind(&collection_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(id,)| id)
        .collect();

        let deleted_cards = card_service::delete_cards_cascade(&mut tx, &card_ids).await?;
        let deleted_collections = collection_service::delete_collections_cascade(&mut tx, &collection_ids).await?;
        let deleted_users = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        info!(
            "Deleted account {}: {} cards, {} collections",
            user_id, deleted_cards, deleted_collections
        );
        Ok(AccountRemoval {
            deleted_cards,
            deleted_collections,
            deleted_users,
        })
    }
}
