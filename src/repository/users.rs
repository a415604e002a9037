use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    error::{AppError, is_unique_violation},
    models::user::{UpdateProfileRequest, User},
};

const USER_COLUMNS: &str = r#"
    id, email, name, avatar, bio, linkedin_url, github_url,
    provider, provider_id, created_at, updated_at
"#;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, AppError>;

    /// Fails with `Conflict` when the email or provider identity is taken.
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    /// Applies the non-empty fields of `changes`. Returns the updated row.
    async fn update_profile(
        &self,
        id: &str,
        changes: &UpdateProfileRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError>;
}

#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, args: &[&str]) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        let mut query = sqlx::query_as::<_, User>(&sql);
        for arg in args {
            query = query.bind(*arg);
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        self.fetch_one_where("id = ?", &[id]).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.fetch_one_where("email = ?", &[email]).await
    }

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, AppError> {
        self.fetch_one_where("provider = ? AND provider_id = ?", &[provider, provider_id])
            .await
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, name, avatar, bio, linkedin_url, github_url,
                provider, provider_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.avatar)
        .bind(&user.bio)
        .bind(&user.linkedin_url)
        .bind(&user.github_url)
        .bind(&user.provider)
        .bind(&user.provider_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("User '{}' already exists", user.email))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(())
    }

    async fn update_profile(
        &self,
        id: &str,
        changes: &UpdateProfileRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                bio = COALESCE(?, bio),
                avatar = COALESCE(?, avatar),
                linkedin_url = COALESCE(?, linkedin_url),
                github_url = COALESCE(?, github_url),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.bio)
        .bind(&changes.avatar)
        .bind(&changes.linkedin_url)
        .bind(&changes.github_url)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await
    }
}
