// src/utils/oauth.rs

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use url::Url;

use crate::{
    config::Config,
    models::user::{ExternalIdentity, PROVIDER_GITHUB, PROVIDER_GOOGLE},
};

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Verified payload of a Google ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleIdentity {
    pub subject_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// GitHub profile as returned by `GET /user`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GitHubProfile {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

impl From<GoogleIdentity> for ExternalIdentity {
    fn from(g: GoogleIdentity) -> Self {
        ExternalIdentity {
            provider: PROVIDER_GOOGLE,
            provider_id: g.subject_id,
            email: g.email,
            name: g.name,
            avatar: g.picture,
            github_url: None,
        }
    }
}

impl From<GitHubProfile> for ExternalIdentity {
    fn from(p: GitHubProfile) -> Self {
        // Accounts with a private email still need a unique address.
        let email = p
            .email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| format!("{}@users.noreply.github.com", p.login));
        ExternalIdentity {
            provider: PROVIDER_GITHUB,
            provider_id: p.id.to_string(),
            email,
            name: p.name.filter(|n| !n.trim().is_empty()).unwrap_or(p.login),
            avatar: p.avatar_url,
            github_url: p.html_url,
        }
    }
}

/// Exchanges third-party credentials for a normalized identity.
///
/// Implementations swallow every provider error and return `None`; callers
/// treat `None` as "authentication failed" without distinguishing causes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve_google(&self, id_token: &str) -> Option<GoogleIdentity>;
    async fn resolve_github(&self, code: &str) -> Option<GitHubProfile>;
}

/// Live adapter talking to Google and GitHub over HTTPS.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    google_client_id: Option<String>,
    github_client_id: Option<String>,
    github_client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubToken {
    access_token: Option<String>,
}

impl OAuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            google_client_id: config.google_client_id.clone(),
            github_client_id: config.github_client_id.clone(),
            github_client_secret: config.github_client_secret.clone(),
        }
    }

    async fn fetch_google(&self, id_token: &str) -> Result<Option<GoogleIdentity>, reqwest::Error> {
        let Some(client_id) = &self.google_client_id else {
            tracing::warn!("Google login attempted but GOOGLE_CLIENT_ID is not configured");
            return Ok(None);
        };
        let Ok(url) = Url::parse_with_params(GOOGLE_TOKENINFO_URL, &[("id_token", id_token)]) else {
            return Ok(None);
        };

        let info: TokenInfo = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if &info.aud != client_id || info.email_verified.as_deref() != Some("true") {
            return Ok(None);
        }
        let Some(email) = info.email else {
            return Ok(None);
        };

        Ok(Some(GoogleIdentity {
            subject_id: info.sub,
            name: info.name.unwrap_or_else(|| email.clone()),
            email,
            picture: info.picture,
        }))
    }

    async fn fetch_github(&self, code: &str) -> Result<Option<GitHubProfile>, reqwest::Error> {
        let (Some(client_id), Some(client_secret)) =
            (&self.github_client_id, &self.github_client_secret)
        else {
            tracing::warn!("GitHub login attempted but GitHub OAuth is not configured");
            return Ok(None);
        };

        let token: GitHubToken = self
            .http
            .post(GITHUB_TOKEN_URL)
            .header(header::ACCEPT, "application/json")
            .json(&serde_json::json!({
                "client_id": client_id,
                "client_secret": client_secret,
                "code": code,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(access_token) = token.access_token else {
            return Ok(None);
        };

        let profile = self
            .http
            .get(GITHUB_USER_URL)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .header(header::USER_AGENT, "folio")
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Some(profile))
    }
}

#[async_trait]
impl IdentityProvider for OAuthClient {
    async fn resolve_google(&self, id_token: &str) -> Option<GoogleIdentity> {
        self.fetch_google(id_token).await.unwrap_or_else(|e| {
            tracing::warn!("Google token verification failed: {}", e);
            None
        })
    }

    async fn resolve_github(&self, code: &str) -> Option<GitHubProfile> {
        self.fetch_github(code).await.unwrap_or_else(|e| {
            tracing::warn!("GitHub code exchange failed: {}", e);
            None
        })
    }
}
