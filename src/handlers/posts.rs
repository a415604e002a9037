use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{CreatePostRequest, Post, PostFields, PostListParams, UpdatePostRequest},
    repository::posts::FeedQuery,
    services::lifecycle,
    state::AppState,
    utils::jwt::{Claims, MaybeClaims},
};

/// List published posts visible to the caller.
/// Supports `q` (search) and `sort` (`newest` | `popular`).
pub async fn list_posts(
    State(state): State<AppState>,
    MaybeClaims(claims): MaybeClaims,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = FeedQuery {
        search: params.q,
        sort: params.sort,
        include_subscribers: claims.is_some(),
    };

    let posts = state.posts.list_published(&query).await?;

    Ok(Json(posts))
}

/// Get a single post by ID.
/// Drafts and restricted posts are reported as missing unless the caller may see them.
pub async fn get_post(
    State(state): State<AppState>,
    MaybeClaims(claims): MaybeClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = claims.as_ref().map(Claims::user_id);

    let post = state
        .posts
        .find_with_author(&id)
        .await?
        .filter(|p| lifecycle::can_view(&p.post, viewer))
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// Create a new post for the caller. Starts as a draft, published right away
/// when `isPublished` is set.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let now = Utc::now();
    let (fields, is_published) = payload.into_fields();

    let mut post = lifecycle::create_draft(claims.user_id(), fields.clone(), now)?;
    if is_published {
        post = lifecycle::publish(post, fields, now)?;
    }

    state.posts.insert(&post).await?;
    tracing::info!("Post {} created by {}", post.id, post.author_id);

    Ok((StatusCode::CREATED, Json(post)))
}

/// Edit a post. Author only.
pub async fn update_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post = owned_post(&state, &id, &claims).await?;
    let (fields, is_published) = payload.into_fields();

    let post = lifecycle::edit(post, fields, is_published, Utc::now())?;
    state.posts.update(&post).await?;

    Ok(Json(post))
}

/// Publish a post without editing it. Author only.
pub async fn publish_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = owned_post(&state, &id, &claims).await?;

    let post = lifecycle::publish(post, PostFields::default(), Utc::now())?;
    state.posts.update(&post).await?;

    Ok(Json(post))
}

/// Take a post back to draft. Author only.
pub async fn unpublish_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = owned_post(&state, &id, &claims).await?;

    let post = lifecycle::unpublish(post, Utc::now());
    state.posts.update(&post).await?;

    Ok(Json(post))
}

/// Delete a post. Author only.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = owned_post(&state, &id, &claims).await?;

    state.posts.delete(&post.id).await?;
    tracing::info!("Post {} deleted by {}", post.id, claims.user_id());

    Ok(Json(json!({ "success": true })))
}

/// Fetches a post and checks that the caller wrote it.
async fn owned_post(state: &AppState, id: &str, claims: &Claims) -> Result<Post, AppError> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    lifecycle::ensure_owner(&post, claims.user_id()).inspect_err(|_| {
        tracing::warn!("User {} tried to modify post {}", claims.user_id(), id);
    })?;

    Ok(post)
}
