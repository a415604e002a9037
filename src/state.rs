use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    repository::{PostRepository, SqlitePostRepository, SqliteUserRepository, UserRepository},
    utils::oauth::{IdentityProvider, OAuthClient},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wires the SQLite repositories and the live OAuth client.
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let identity = Arc::new(OAuthClient::new(&config));
        Self {
            posts: Arc::new(SqlitePostRepository::new(pool.clone())),
            users: Arc::new(SqliteUserRepository::new(pool)),
            identity,
            config,
        }
    }

    /// Replaces the identity provider (used to stub Google/GitHub).
    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
