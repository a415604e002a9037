// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{self, auth, interaction, posts, profile},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, posts, author dashboard, user profile).
/// * Protected routes go through `auth_middleware`; the rest read an optional token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/google", post(auth::google_login))
        .route("/github", post(auth::github_login));

    let post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route("/{id}", get(posts::get_post))
        .route("/{id}/like", post(interaction::like_post))
        // Author-only mutations
        .merge(
            Router::new()
                .route("/", post(posts::create_post))
                .route("/{id}", put(posts::update_post).delete(posts::delete_post))
                .route("/{id}/publish", post(posts::publish_post))
                .route("/{id}/unpublish", post(posts::unpublish_post))
                .route_layer(require_auth.clone()),
        );

    let author_routes = Router::new()
        .route("/posts", get(profile::list_author_posts))
        .route("/stats", get(profile::author_stats))
        .route_layer(require_auth.clone());

    let user_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route_layer(require_auth);

    Router::new()
        .route("/api/health", get(handlers::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/posts", post_routes)
        .nest("/api/author", author_routes)
        .nest("/api/user", user_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
