// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Default token lifetime: 7 days.
pub const DEFAULT_JWT_EXPIRATION: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub port: u16,
    pub rust_log: String,
    pub cors_origins: Vec<String>,

    pub google_client_id: Option<String>,
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,

    /// Seeded local author (inserted at start-up when absent).
    pub default_author_email: Option<String>,
    pub default_author_name: Option<String>,

    /// Take the client address from `X-Forwarded-For` (only behind a reverse proxy).
    pub trust_proxy: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://blog.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_JWT_EXPIRATION);

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3001);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            port,
            rust_log,
            cors_origins,
            google_client_id: non_empty_var("GOOGLE_CLIENT_ID"),
            github_client_id: non_empty_var("GITHUB_CLIENT_ID"),
            github_client_secret: non_empty_var("GITHUB_CLIENT_SECRET"),
            default_author_email: non_empty_var("DEFAULT_AUTHOR_EMAIL"),
            default_author_name: non_empty_var("DEFAULT_AUTHOR_NAME"),
            trust_proxy: non_empty_var("TRUST_PROXY")
                .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
