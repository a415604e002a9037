use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::UpdateProfileRequest,
    state::AppState,
    utils::{html::clean_html, jwt::Claims},
};

/// Get the current user's profile.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_id(claims.user_id())
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update the current user's profile (name, bio, avatar and social links only).
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.name = payload.name.map(|n| n.trim().to_string());
    payload.validate()?;

    payload.bio = payload.bio.as_deref().map(clean_html);

    let user = state
        .users
        .update_profile(claims.user_id(), &payload, Utc::now())
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// List every post of the current user, drafts included (newest first).
pub async fn list_author_posts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let posts = state.posts.list_by_author(claims.user_id()).await?;

    Ok(Json(posts))
}

/// Dashboard counters for the current user.
pub async fn author_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.posts.author_stats(claims.user_id()).await?;

    Ok(Json(stats))
}
