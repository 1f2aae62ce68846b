use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use spacer_server::accounts;
use spacer_server::auth::TokenKeys;
use spacer_server::config::Config;
use spacer_server::mailer::LogMailer;
use spacer_server::repository::Repositories;
use spacer_server::routes::create_routes;
use spacer_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let repos = match &config.database {
        Some(database) => {
            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Successfully connected to database");

            sqlx::migrate!()
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations run successfully");

            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Repositories::in_memory()
        }
    };

    let auth = &config.auth;
    let state = AppState::new(
        repos,
        TokenKeys::new(&auth.jwt_secret, auth.access_ttl, auth.refresh_ttl),
        Arc::new(LogMailer),
        auth.require_verified_email,
    );

    if let Some(seed) = &config.admin {
        accounts::ensure_admin(&state, seed)
            .await
            .context("Failed to ensure admin account")?;
    }

    let app = create_routes(state, &config);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
