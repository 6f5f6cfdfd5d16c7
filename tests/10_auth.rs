mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn signup_provisions_main_collection() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let username = common::unique("user");

    let res = app.signup(&username).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;

    let user = &body["data"]["user"];
    let collection = &body["data"]["collection"];
    assert_eq!(user["username"], username.as_str());
    assert!(user.get("password").is_none(), "password hash must not be returned");
    assert_eq!(collection["title"], username.as_str());
    assert_eq!(collection["owner"], user["id"]);
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_is_conflict() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let username = common::unique("user");

    assert_eq!(app.signup(&username).await?.status(), StatusCode::OK);
    assert_eq!(app.signup(&username).await?.status(), StatusCode::CONFLICT);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(&app.pool)
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn signup_requires_username_and_password() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };

    for body in [json!({ "username": "  ", "password": "123password" }), json!({ "username": common::unique("user") })] {
        let res = app.client.post(app.url("/auth/signup")).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let res = app
        .client
        .post(app.url("/auth/signup"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let (username, _) = app.new_user().await?;

    let res = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": username, "password": "not-the-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": common::unique("ghost"), "password": common::PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_returns_username_and_token() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let username = common::unique("user");
    app.signup(&username).await?;

    let res = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": username, "password": common::PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["username"], username.as_str());
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_valid_token() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };

    let res = app.client.get(app.url("/collections/count")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.get("/collections/count", "not.a.token").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (_, token) = app.new_user().await?;
    let res = app.get("/collections/count", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["count"], 1);
    Ok(())
}

#[tokio::test]
async fn logout_needs_authorization_header() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let (_, token) = app.new_user().await?;

    assert_eq!(app.post("/auth/logout", &token).send().await?.status(), StatusCode::OK);
    let res = app.client.post(app.url("/auth/logout")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn password_change_takes_effect() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let (username, token) = app.new_user().await?;

    let res = app.put("/auth/password", &token).json(&json!({ "password": "" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .put("/auth/password", &token)
        .json(&json!({ "password": "new-password-1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    assert!(app.login(&username).await.is_err());
    let res = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": username, "password": "new-password-1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn delete_account_cascades() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let (username, token) = app.new_user().await?;
    let card = app.create_card(&token, &common::card_body("Sue Bird", 2002, "Topps", "WNBA")).await?;
    let card_id = common::id_of(&card);

    let res = app.delete("/auth/delete", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["deletedCards"], 1);
    assert_eq!(body["data"]["deletedCollections"], 1);

    assert_eq!(app.membership_count("card", &card_id).await?, 0);
    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(&app.pool)
        .await?;
    assert_eq!(users, 0);
    Ok(())
}

#[tokio::test]
async fn user_directory_is_admin_only() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let (username, token) = app.new_user().await?;
    let (_, admin_token) = app.new_admin().await?;

    assert_eq!(app.get("/auth/users", &token).send().await?.status(), StatusCode::UNAUTHORIZED);

    let res = app.get("/auth/users", &admin_token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let users = body["data"]["users"].as_array().cloned().unwrap_or_default();
    assert!(users.iter().any(|u| u == username.as_str()));

    let res = app
        .put(&format!("/auth/users/{}/roles", username), &admin_token)
        .json(&json!({ "roles": ["user", "admin"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["roles"], json!(["user", "admin"]));
    Ok(())
}
