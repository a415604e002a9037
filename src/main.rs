// src/main.rs

use chrono::Utc;
use dotenvy::dotenv;
use folio::config::Config;
use folio::services::accounts::ensure_local_author;
use folio::state::AppState;
use folio::{db, routes};
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to open the database");
    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    db::migrate(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    let state = AppState::new(pool, config.clone());

    // Seed the default author
    if let Some(email) = &config.default_author_email {
        let name = config.default_author_name.as_deref().unwrap_or("Author");
        match ensure_local_author(state.users.as_ref(), email, name, Utc::now()).await {
            Ok(user) => tracing::info!("Default author ready: {} ({})", user.email, user.id),
            Err(e) => tracing::error!("Failed to seed default author: {:?}", e),
        }
    }

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server (peer addresses feed like de-duplication)
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
