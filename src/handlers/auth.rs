// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{ExternalIdentity, GitHubLoginRequest, GoogleLoginRequest},
    services::accounts::resolve_user,
    state::AppState,
    utils::jwt::sign_jwt,
};

fn authentication_failed() -> AppError {
    AppError::AuthError("Authentication failed".to_string())
}

/// Signs in with a Google ID token.
///
/// Creates the account on first login and returns a session JWT.
pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let identity = state
        .identity
        .resolve_google(&payload.token)
        .await
        .ok_or_else(authentication_failed)?;

    issue_session(&state, identity.into()).await
}

/// Signs in with a GitHub OAuth authorization code.
pub async fn github_login(
    State(state): State<AppState>,
    Json(payload): Json<GitHubLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = state
        .identity
        .resolve_github(&payload.code)
        .await
        .ok_or_else(authentication_failed)?;

    issue_session(&state, profile.into()).await
}

async fn issue_session(
    state: &AppState,
    identity: ExternalIdentity,
) -> Result<Json<Value>, AppError> {
    let user = resolve_user(state.users.as_ref(), identity, Utc::now()).await?;

    let token = sign_jwt(&user, &state.config.jwt_secret, state.config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": user,
    })))
}
