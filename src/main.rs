// src/main.rs

use std::{sync::Arc, time::Duration};

use civique::{
    bank::FsQuestionSource,
    config::Config,
    routes,
    state::AppState,
    store::SqliteRepository,
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (and .env, if present)
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "civique.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to open database {}: {:?}", config.database_url, e);
            e
        })?;
    tracing::info!("Database connected...");

    let repo = SqliteRepository::new(pool);
    tracing::info!("Running migrations...");
    repo.migrate().await?;
    tracing::info!("Migrations applied successfully.");

    let bank = FsQuestionSource::new(&config.data_dir);
    tracing::info!("Question banks read from {}", config.data_dir.display());

    let addr = config.bind_addr;
    let state = AppState::new(config, Arc::new(repo), Arc::new(bank)).await?;
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
