// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const PROVIDER_LOCAL: &str = "local";
pub const PROVIDER_GOOGLE: &str = "google";
pub const PROVIDER_GITHUB: &str = "github";

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// Unique across all accounts.
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,

    /// Identity source: 'local', 'google' or 'github'.
    pub provider: String,

    /// Subject id at the provider. Not exposed to clients.
    #[serde(skip)]
    pub provider_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized identity returned by a provider adapter, used to find or create a `User`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub provider: &'static str,
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub github_url: Option<String>,
}

/// DTO for Google sign-in. `token` is the Google ID token.
#[derive(Debug, Deserialize, Validate)]
pub struct GoogleLoginRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

/// DTO for GitHub sign-in. `code` is the OAuth authorization code.
#[derive(Debug, Deserialize, Validate)]
pub struct GitHubLoginRequest {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
}

/// DTO for profile edits. Only these fields are client-writable.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 chars"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 chars"))]
    pub bio: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,

    #[validate(url(message = "LinkedIn URL must be a valid URL"))]
    pub linkedin_url: Option<String>,

    #[validate(url(message = "GitHub URL must be a valid URL"))]
    pub github_url: Option<String>,
}
