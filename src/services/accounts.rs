use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user::{ExternalIdentity, PROVIDER_GITHUB, PROVIDER_LOCAL, User},
    repository::UserRepository,
};

/// Finds the account behind a provider identity, creating it on first login.
///
/// Accounts are matched on (provider, provider_id) first. Google identities
/// then fall back to email, which also picks up a seeded local author. An
/// existing row is returned unchanged: name, email and avatar are not
/// refreshed from the provider on repeat logins.
pub async fn resolve_user(
    users: &dyn UserRepository,
    identity: ExternalIdentity,
    now: DateTime<Utc>,
) -> Result<User, AppError> {
    if let Some(user) = users
        .find_by_provider(identity.provider, &identity.provider_id)
        .await?
    {
        return Ok(user);
    }
    if identity.provider != PROVIDER_GITHUB {
        if let Some(user) = users.find_by_email(&identity.email).await? {
            return Ok(user);
        }
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: identity.email,
        name: identity.name,
        avatar: identity.avatar,
        bio: None,
        linkedin_url: None,
        github_url: identity.github_url,
        provider: identity.provider.to_string(),
        provider_id: Some(identity.provider_id),
        created_at: now,
        updated_at: now,
    };

    match users.insert(&user).await {
        Ok(()) => {
            tracing::info!("Created {} account for {}", user.provider, user.email);
            Ok(user)
        }
        Err(AppError::Conflict(_)) => resolve_conflict(users, &user).await,
        Err(e) => Err(e),
    }
}

/// Picks the row that blocked inserting `user`: a concurrent first login with
/// the same provider id, or another account already owning the email.
async fn resolve_conflict(users: &dyn UserRepository, user: &User) -> Result<User, AppError> {
    let provider_id = user.provider_id.as_deref().unwrap_or_default();
    if let Some(existing) = users.find_by_provider(&user.provider, provider_id).await? {
        return Ok(existing);
    }

    let existing = users
        .find_by_email(&user.email)
        .await?
        .ok_or_else(|| AppError::InternalServerError("account vanished during login".into()))?;
    tracing::warn!(
        "{} login {} matched existing {} account {} by email {}",
        user.provider,
        provider_id,
        existing.provider,
        existing.id,
        user.email
    );
    Ok(existing)
}

/// Inserts a local author with `email` unless one already exists.
pub async fn ensure_local_author(
    users: &dyn UserRepository,
    email: &str,
    name: &str,
    now: DateTime<Utc>,
) -> Result<User, AppError> {
    if let Some(user) = users.find_by_email(email).await? {
        return Ok(user);
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: name.to_string(),
        avatar: None,
        bio: None,
        linkedin_url: None,
        github_url: None,
        provider: PROVIDER_LOCAL.to_string(),
        provider_id: None,
        created_at: now,
        updated_at: now,
    };
    users.insert(&user).await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        models::user::PROVIDER_GOOGLE,
        repository::SqliteUserRepository,
    };

    async fn repo() -> SqliteUserRepository {
        let pool = db::connect_in_memory().await.unwrap();
        db::migrate(&pool).await.unwrap();
        SqliteUserRepository::new(pool)
    }

    fn identity(provider: &'static str, provider_id: &str, email: &str) -> ExternalIdentity {
        ExternalIdentity {
            provider,
            provider_id: provider_id.to_string(),
            email: email.to_string(),
            name: "Ada".to_string(),
            avatar: None,
            github_url: None,
        }
    }

    #[tokio::test]
    async fn first_login_creates_then_reuses() {
        let users = repo().await;
        let now = Utc::now();

        let created = resolve_user(&users, identity(PROVIDER_GOOGLE, "g1", "ada@example.com"), now)
            .await
            .unwrap();
        assert_eq!(created.provider, PROVIDER_GOOGLE);
        assert_eq!(created.provider_id.as_deref(), Some("g1"));

        let mut renamed = identity(PROVIDER_GOOGLE, "g1", "ada@example.com");
        renamed.name = "New Name".to_string();
        let again = resolve_user(&users, renamed, now).await.unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(again.name, "Ada");
    }

    #[tokio::test]
    async fn github_login_with_taken_email_signs_into_existing_account() {
        let users = repo().await;
        let now = Utc::now();

        let google = resolve_user(&users, identity(PROVIDER_GOOGLE, "g1", "ada@example.com"), now)
            .await
            .unwrap();
        let github = resolve_user(&users, identity(PROVIDER_GITHUB, "77", "ada@example.com"), now)
            .await
            .unwrap();
        assert_eq!(google.id, github.id);
    }

    #[tokio::test]
    async fn google_login_after_email_change_keeps_the_account() {
        let users = repo().await;
        let now = Utc::now();

        let first = resolve_user(&users, identity(PROVIDER_GOOGLE, "g1", "old@example.com"), now)
            .await
            .unwrap();
        let second = resolve_user(&users, identity(PROVIDER_GOOGLE, "g1", "new@example.com"), now)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.email, "old@example.com");
    }

    #[tokio::test]
    async fn google_login_adopts_the_seeded_author_by_email() {
        let users = repo().await;
        let now = Utc::now();

        let seeded = ensure_local_author(&users, "ada@example.com", "Ada", now).await.unwrap();
        let google = resolve_user(&users, identity(PROVIDER_GOOGLE, "g1", "ada@example.com"), now)
            .await
            .unwrap();
        assert_eq!(seeded.id, google.id);
    }

    #[tokio::test]
    async fn seeding_the_local_author_is_idempotent() {
        let users = repo().await;
        let now = Utc::now();

        let first = ensure_local_author(&users, "author@example.com", "John", now).await.unwrap();
        let second = ensure_local_author(&users, "author@example.com", "Other", now).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.provider, PROVIDER_LOCAL);
    }
}
