use guild_gallery_access::{MemorySessionStore, SessionStore, SitePassword};
use guild_gallery_images::{FsBlobStore, Gallery};
use guild_gallery_server::{
    app::{AppState, router},
    auth::PgSessionStore,
    config::ServerConfig,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let sessions: Arc<dyn SessionStore> = match &config.database_url {
        Some(database_url) => {
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .expect("failed to connect to database");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&db_pool)
                .await
                .expect("failed to run migrations");

            Arc::new(PgSessionStore::new(db_pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sessions are kept in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    // Cleanup expired sessions on startup
    match sessions.delete_expired().await {
        Ok(count) if count > 0 => {
            tracing::info!(
                deleted_sessions = count,
                "Cleaned up expired sessions on startup"
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Failed to cleanup expired sessions on startup");
        }
    }

    // Spawn periodic session cleanup task
    let cleanup_sessions = sessions.clone();
    let cleanup_interval_secs = config.session.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            match cleanup_sessions.delete_expired().await {
                Ok(count) if count > 0 => {
                    tracing::debug!(deleted_sessions = count, "Periodic session cleanup");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to cleanup expired sessions");
                }
            }
        }
    });

    let blob_url_base = format!("{}/blobs", config.public_base_url.trim_end_matches('/'));
    let blob_store = FsBlobStore::open(&config.images.storage_dir, blob_url_base)
        .await
        .expect("failed to open image storage");
    let gallery = Gallery::new(blob_store, config.images.upload_policy());

    if config.site_password.is_none() {
        tracing::warn!("SITE_PASSWORD not set, only Discord login grants site access");
    }

    // Create application state
    let app_state = AppState::new(
        sessions,
        &config.discord,
        gallery,
        config.session,
        SitePassword::new(config.site_password),
    )
    .expect("failed to create Discord client");

    let app = router(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
