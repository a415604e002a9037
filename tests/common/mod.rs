// tests/common/mod.rs

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use folio::{
    config::{Config, DEFAULT_JWT_EXPIRATION},
    db, routes,
    state::AppState,
    utils::oauth::{GitHubProfile, GoogleIdentity, IdentityProvider},
};
use serde_json::Value;

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

/// Stands in for Google and GitHub.
///
/// * Google token `valid:<handle>[:<name>]` resolves to `<handle>@example.com`.
/// * GitHub code `gh:<id>:<login>` resolves to a profile without a public email.
/// * Anything else fails.
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn resolve_google(&self, id_token: &str) -> Option<GoogleIdentity> {
        let rest = id_token.strip_prefix("valid:")?;
        let mut parts = rest.splitn(2, ':');
        let handle = parts.next()?.to_string();
        let name = parts.next().map(str::to_string).unwrap_or_else(|| handle.clone());
        Some(GoogleIdentity {
            subject_id: format!("google-{}", handle),
            email: format!("{}@example.com", handle),
            name,
            picture: Some(format!("https://pics.example/{}", handle)),
        })
    }

    async fn resolve_github(&self, code: &str) -> Option<GitHubProfile> {
        let rest = code.strip_prefix("gh:")?;
        let (id, login) = rest.split_once(':')?;
        Some(GitHubProfile {
            id: id.parse().ok()?,
            login: login.to_string(),
            email: None,
            name: None,
            avatar_url: None,
            html_url: Some(format!("https://github.com/{}", login)),
        })
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port over a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(false).await
}

/// Same as [`spawn_app`], but trusting `X-Forwarded-For` as a reverse proxy
/// deployment would.
pub async fn spawn_app_behind_proxy() -> TestApp {
    spawn_app_with(true).await
}

async fn spawn_app_with(trust_proxy: bool) -> TestApp {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to open in-memory SQLite");

    db::migrate(&pool).await.expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration: DEFAULT_JWT_EXPIRATION,
        port: 0,
        rust_log: "error".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        google_client_id: None,
        github_client_id: None,
        github_client_secret: None,
        default_author_email: None,
        default_author_name: None,
        trust_proxy,
    };

    let state = AppState::new(pool, config).with_identity_provider(Arc::new(StubProvider));
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Signs in through the stubbed Google flow and returns (token, user json).
    pub async fn login(&self, handle: &str) -> (String, Value) {
        let body: Value = self
            .client
            .post(self.url("/api/auth/google"))
            .json(&serde_json::json!({ "token": format!("valid:{}", handle) }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        let token = body["token"].as_str().expect("Token not found").to_string();
        (token, body["user"].clone())
    }

    /// Creates a post as `token` and returns the response json.
    pub async fn create_post(&self, token: &str, payload: Value) -> Value {
        let response = self
            .client
            .post(self.url("/api/posts"))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .expect("Create post failed");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }
}
