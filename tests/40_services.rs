mod common;

use anyhow::Result;
use uuid::Uuid;

use cardvault_api::database::models::NewCard;
use cardvault_api::database::DataError;
use cardvault_api::services::{CardService, CollectionService, UserService};

fn new_card(body: serde_json::Value) -> Result<NewCard> {
    Ok(serde_json::from_value(body)?)
}

async fn count(app: &common::TestApp, sql: &str, id: Uuid) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as(sql).bind(id).fetch_one(&app.pool).await?;
    Ok(count)
}

#[tokio::test]
async fn create_card_refuses_duplicate_certification() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let cards = CardService::new(app.pool.clone());
    let card = new_card(common::card_body("Sue Bird", 2002, "Topps", "WNBA"))?;

    let created = cards.create_card(&card).await?;
    assert_eq!(created.certification_number, card.certification_number);
    // Standalone creation links the card nowhere
    assert_eq!(app.membership_count("card", &created.id.to_string()).await?, 0);

    let mut again = new_card(common::card_body("Babe Ruth", 1933, "Goudey", "Big League"))?;
    again.certification_number = card.certification_number.clone();
    assert!(matches!(cards.create_card(&again).await, Err(DataError::DuplicateKey(_))));

    // Same number under another grading company is a different card
    again.grading_company = "BGS".to_string();
    assert!(cards.create_card(&again).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn get_card_collection_by_id() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let collections = CollectionService::new(app.pool.clone());
    let (username, token) = app.new_user().await?;
    let main = app.main_collection(&username, &token).await?;

    let found = collections.get_card_collection(&common::id_of(&main)).await?;
    assert_eq!(found.map(|c| c.title), Some(username));

    assert!(collections.get_card_collection(&Uuid::new_v4().to_string()).await?.is_none());
    assert!(matches!(
        collections.get_card_collection("not-an-id").await,
        Err(DataError::InvalidIdentifier(_))
    ));
    Ok(())
}

#[tokio::test]
async fn delete_user_removes_only_the_user_row() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let users = UserService::new(app.pool.clone());

    let bare = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, username, password) VALUES ($1, $2, 'x')")
        .bind(bare)
        .bind(common::unique("bare"))
        .execute(&app.pool)
        .await?;
    assert_eq!(users.delete_user(&bare.to_string()).await?, 1);
    assert_eq!(users.delete_user(&bare.to_string()).await?, 0);
    assert!(matches!(users.delete_user("nope").await, Err(DataError::InvalidIdentifier(_))));

    // A user who still owns collections keeps them; the row delete is refused
    let (username, _) = app.new_user().await?;
    let user = users.get_user(&username).await?.ok_or_else(|| anyhow::anyhow!("user missing"))?;
    assert!(users.delete_user(&user.id.to_string()).await.is_err());
    assert_eq!(count(&app, "SELECT COUNT(*) FROM users WHERE id = $1", user.id).await?, 1);
    assert_eq!(count(&app, "SELECT COUNT(*) FROM card_collections WHERE owner_id = $1", user.id).await?, 1);
    Ok(())
}
