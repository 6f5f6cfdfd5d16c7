#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use cardvault_api::database::DatabaseManager;
use cardvault_api::services::UserService;
use cardvault_api::{api, AppConfig, AppState};

pub const PASSWORD: &str = "123password";

/// An in-process server bound to a free port
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub pool: PgPool,
}

/// `Ok(None)` when DATABASE_URL is unset, so suites pass without a database
pub async fn spawn_app() -> Result<Option<TestApp>> {
    spawn_app_with(|_| {}).await
}

/// Like `spawn_app`, with a hook to adjust the development config first
pub async fn spawn_app_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Option<TestApp>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    };

    let mut config = AppConfig::development();
    config.database.url = url;
    config.database.max_connections = 5;
    configure(&mut config);

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let app = api::router(AppState::new(pool.clone(), config));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let test_app = TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: Client::new(),
        pool,
    };
    test_app.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(test_app))
}

/// Username or certification number that no other test will use
pub fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

/// A complete card body with a fresh certification number
pub fn card_body(subject: &str, year: i32, brand: &str, card_set: &str) -> Value {
    json!({
        "year": year,
        "brand": brand,
        "cardNumber": "1",
        "cardSet": card_set,
        "subject": subject,
        "variety": "Base",
        "gradingCompany": "PSA",
        "grade": "10",
        "certificationNumber": unique("cert"),
        "sold": false
    })
}

impl TestApp {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// POST /auth/signup and return the response
    pub async fn signup(&self, username: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/auth/signup"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str) -> Result<String> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());

        let body: Value = resp.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    /// Sign up a fresh user and return `(username, token)`
    pub async fn new_user(&self) -> Result<(String, String)> {
        let username = unique("user");
        let resp = self.signup(&username).await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "signup failed: {}", resp.status());
        let token = self.login(&username).await?;
        Ok((username, token))
    }

    /// Fresh user holding the admin role; the token is issued after the grant
    pub async fn new_admin(&self) -> Result<(String, String)> {
        let (username, _) = self.new_user().await?;
        UserService::new(self.pool.clone())
            .update_user_roles(&username, &["user".to_string(), "admin".to_string()])
            .await?
            .context("admin user vanished")?;
        let token = self.login(&username).await?;
        Ok((username, token))
    }

    /// POST /cards and return the created card
    pub async fn create_card(&self, token: &str, body: &Value) -> Result<Value> {
        let resp = self.post("/cards", token).json(body).send().await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "card create failed: {}", resp.status());
        let body: Value = resp.json().await?;
        Ok(body["data"]["card"].clone())
    }

    /// The caller's main collection (titled with their username)
    pub async fn main_collection(&self, username: &str, token: &str) -> Result<Value> {
        let resp = self
            .get("/collections", token)
            .query(&[("ownerName", username), ("title", username)])
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "main collection lookup failed: {}", resp.status());
        let body: Value = resp.json().await?;
        Ok(body["data"]["collection"].clone())
    }

    pub async fn membership_count(&self, column: &str, id: &str) -> Result<i64> {
        let id = Uuid::parse_str(id)?;
        let sql = match column {
            "card" => "SELECT COUNT(*) FROM collection_for_card WHERE trading_card_id = $1",
            _ => "SELECT COUNT(*) FROM collection_for_card WHERE card_collection_id = $1",
        };
        let (count,): (i64,) = sqlx::query_as(sql).bind(id).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}
