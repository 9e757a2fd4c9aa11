//! Application state and HTTP routing.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use guild_gallery_access::{AuthorizationGate, SessionStore, SitePassword};
use guild_gallery_images::{FsBlobStore, Gallery};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    api,
    auth::{self, DiscordMembershipClient, DiscordOAuthClient, DiscordOAuthError},
    config::{DiscordConfig, SessionConfig},
    pages,
};

/// Multipart framing allowance on top of the upload size limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Shared application state.
pub struct AppState {
    /// Session persistence.
    pub sessions: Arc<dyn SessionStore>,
    /// Guild role check run on every login.
    pub gate: AuthorizationGate<DiscordMembershipClient>,
    /// Discord OAuth client for login.
    pub discord: DiscordOAuthClient,
    /// Image gallery.
    pub gallery: Gallery<FsBlobStore>,
    /// Session configuration.
    pub session_config: SessionConfig,
    /// Shared site password.
    pub site_password: SitePassword,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Discord configuration is invalid.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        discord_config: &DiscordConfig,
        gallery: Gallery<FsBlobStore>,
        session_config: SessionConfig,
        site_password: SitePassword,
    ) -> Result<Self, DiscordOAuthError> {
        let discord = DiscordOAuthClient::new(discord_config)?;
        let membership = DiscordMembershipClient::new(
            discord_config.api_base_url.clone(),
            discord.http_client().clone(),
        );
        let gate = AuthorizationGate::new(membership, discord_config.gate_config());

        Ok(Self {
            sessions,
            gate,
            discord,
            gallery,
            session_config,
            site_password,
        })
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.gallery.policy().max_bytes() + MULTIPART_OVERHEAD_BYTES;
    let blob_dir = ServeDir::new(state.gallery.store().root());

    Router::new()
        // Pages
        .route("/", get(pages::home))
        .route("/dashboard", get(pages::dashboard))
        .route("/login", get(pages::login))
        // Auth routes
        .route("/auth/discord", get(auth::login))
        .route("/auth/discord/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        // API
        .route(
            "/api/images",
            get(api::images::list)
                .post(api::images::upload)
                .delete(api::images::delete)
                .layer(DefaultBodyLimit::max(
                    usize::try_from(upload_limit).unwrap_or(usize::MAX),
                )),
        )
        .route("/api/user-images", get(api::images::user_images))
        .route("/api/session", get(api::session::session_info))
        .route("/api/auth/verify-password", post(api::session::verify_password))
        .nest_service("/blobs", blob_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
