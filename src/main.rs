mod attachment;
mod auth;
mod board;
mod db;
mod error;
mod middleware;
mod note;
mod routes;
mod state;
mod tag;

use anyhow::Context;
use db::{create_pool, run_migrations};
use routes::create_router;
use state::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,klat=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    let http = reqwest::Client::builder()
        .user_agent(concat!("klat/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let store = config.object_store(http);

    tracing::info!(
        bucket = %config.storage_bucket,
        max_upload_bytes = config.max_upload_bytes,
        invalid_deadline = ?config.invalid_deadline,
        "Attachment storage configured"
    );

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState::new(db, config, store);
    let app = create_router(state);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
