//! Authentication module for the guild-gallery server.
//!
//! This module provides:
//! - Discord OAuth login with guild role gating
//! - Session persistence (PostgreSQL or in-memory)
//! - Session extractors for Axum routes
//!
//! # Authorization Model
//!
//! A visitor is either anonymous, site-authenticated (entered the shared
//! site password) or logged in. Logging in requires holding the configured
//! role in the configured Discord guild; the check is made once, at login,
//! by [`guild_gallery_access::AuthorizationGate`]. Role changes take effect
//! on the next login.

pub mod db;
pub mod discord;
pub mod membership;
pub mod middleware;
pub mod routes;

use axum_extra::extract::cookie::{Cookie, SameSite};
use guild_gallery_core::SessionId;
use time::Duration as TimeDuration;

use crate::config::SessionConfig;

pub use db::PgSessionStore;
pub use discord::{DiscordAuthState, DiscordOAuthClient, DiscordOAuthError};
pub use membership::DiscordMembershipClient;
pub use middleware::{ApiSiteAccess, ApiUser, AuthRejection, CurrentSession, RequireUser};
pub use routes::{callback, login, logout};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Auth state cookie name (CSRF and PKCE state during the Discord flow).
pub const AUTH_STATE_COOKIE: &str = "discord_auth_state";

/// Builds the session cookie for `id`.
pub(crate) fn session_cookie(id: SessionId, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(config.duration_minutes))
        .build()
}

/// Builds a cookie that clears `name`.
pub(crate) fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}
