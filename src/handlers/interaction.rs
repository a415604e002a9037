use std::{convert::Infallible, net::SocketAddr};

use axum::{
    Json,
    extract::{ConnectInfo, FromRef, FromRequestParts, Path, State},
    http::{HeaderMap, request::Parts},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    config::Config,
    error::AppError,
    models::like::LikeIdentity,
    services::lifecycle,
    state::AppState,
    utils::jwt::MaybeClaims,
};

/// Originating address of the request: the TCP peer, or the first
/// `X-Forwarded-For` hop when `trust_proxy` is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
    Config: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Config::from_ref(state);
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientIp(client_address(&parts.headers, peer, config.trust_proxy)))
    }
}

/// The header is client-controlled, so it only counts when a proxy we run
/// sets it.
fn client_address(headers: &HeaderMap, peer: Option<String>, trust_proxy: bool) -> Option<String> {
    if !trust_proxy {
        return peer;
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or(peer)
}

/// Like a post.
///
/// Works anonymously; a valid bearer token adds the user id to the identity.
/// A second like from the same user or address is rejected. There is no unlike.
pub async fn like_post(
    State(state): State<AppState>,
    MaybeClaims(claims): MaybeClaims,
    ClientIp(ip): ClientIp,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.map(|c| c.sub);

    let post = state
        .posts
        .find_by_id(&post_id)
        .await?
        .filter(|p| lifecycle::can_view(p, user_id.as_deref()))
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let like = lifecycle::new_like(&post, LikeIdentity { user_id, ip }, Utc::now())?;
    let likes = state.posts.record_like(&like).await?;

    Ok(Json(serde_json::json!({ "success": true, "likes": likes })))
}
