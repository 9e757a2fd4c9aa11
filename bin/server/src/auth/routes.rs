//! Authentication routes for login, callback, and logout.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use guild_gallery_access::{AuthzError, Session};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use time::Duration as TimeDuration;
use tracing::{error, info, instrument, warn};

use super::{
    AUTH_STATE_COOKIE, DiscordAuthState, SESSION_COOKIE, db::parse_session_id, removal_cookie,
    session_cookie,
};
use crate::app::AppState;

/// Where failed logins land.
pub const LOGIN_FAILED_REDIRECT: &str = "/?error=unauthorized";

/// Query parameters for the Discord callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Starts the Discord login flow by redirecting to Discord.
pub async fn login(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (auth_url, auth_state) = state.discord.authorization_url();

    // Store the auth state in a secure cookie for validation on callback
    let auth_state_json = match serde_json::to_string(&auth_state) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to encode auth state");
            return Redirect::to(LOGIN_FAILED_REDIRECT).into_response();
        }
    };

    let cookie = Cookie::build((AUTH_STATE_COOKIE, auth_state_json))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    (jar.add(cookie), Redirect::to(&auth_url)).into_response()
}

/// Handles the redirect back from Discord.
///
/// Success stores a new session and sets the session cookie. Every failure
/// redirects to `/?error=unauthorized` without one.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    let jar_without_state = jar.clone().add(removal_cookie(AUTH_STATE_COOKIE));

    match complete_login(&state, query, &jar).await {
        Ok(session) => {
            info!(session_id = %session.id(), "login succeeded");
            let jar = jar_without_state.add(session_cookie(session.id(), &state.session_config));
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => {
            e.log();
            (jar_without_state, Redirect::to(LOGIN_FAILED_REDIRECT)).into_response()
        }
    }
}

#[instrument(skip_all)]
async fn complete_login(
    state: &AppState,
    query: CallbackQuery,
    jar: &CookieJar,
) -> Result<Session, LoginError> {
    if let Some(error) = query.error {
        return Err(LoginError::ProviderDenied {
            error,
            description: query.error_description,
        });
    }

    // Retrieve and validate auth state from cookie
    let auth_state_cookie = jar
        .get(AUTH_STATE_COOKIE)
        .ok_or(LoginError::MissingAuthState)?;

    let auth_state: DiscordAuthState =
        serde_json::from_str(auth_state_cookie.value()).map_err(|_| LoginError::InvalidAuthState)?;

    // Validate CSRF token
    if query.state.as_deref() != Some(auth_state.csrf_token.as_str()) {
        return Err(LoginError::CsrfMismatch);
    }

    let code = query.code.ok_or(LoginError::MissingCode)?;

    let token = state
        .discord
        .exchange_code(&code, &auth_state.pkce_verifier)
        .await
        .map_err(|e| LoginError::TokenExchange(e.to_string()))?;

    let identity = state
        .discord
        .fetch_identity(&token)
        .await
        .map_err(|e| LoginError::Profile(e.to_string()))?;

    let mut session = state
        .gate
        .authorize(&identity, &token)
        .await
        .map_err(LoginError::Gate)?;

    // Rotate the session: keep the site password flag, drop the old ID
    let previous = previous_session(state, jar).await;
    if previous.as_ref().is_some_and(Session::site_authenticated) {
        session.mark_site_authenticated();
    }

    state
        .sessions
        .save(&session, state.session_config.ttl())
        .await
        .map_err(|e| LoginError::Persist(e.to_string()))?;

    // The old session is only dropped once the new one is stored
    if let Some(previous) = previous {
        if let Err(e) = state.sessions.delete(previous.id()).await {
            warn!(session_id = %previous.id(), error = %e, "failed to delete replaced session");
        }
    }

    Ok(session)
}

async fn previous_session(state: &AppState, jar: &CookieJar) -> Option<Session> {
    let id = parse_session_id(jar.get(SESSION_COOKIE)?.value())?;
    match state.sessions.load(id).await {
        Ok(session) => session,
        Err(e) => {
            warn!(session_id = %id, error = %e, "failed to load previous session");
            None
        }
    }
}

/// Logs out the user by deleting their session.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_id) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| parse_session_id(cookie.value()))
    {
        if let Err(e) = state.sessions.delete(session_id).await {
            warn!(session_id = %session_id, error = %e, "failed to delete session on logout");
        }
    }

    (jar.add(removal_cookie(SESSION_COOKIE)), Redirect::to("/"))
}

/// Reasons a login attempt failed.
#[derive(Debug)]
pub enum LoginError {
    /// Discord returned an error instead of a code (e.g. consent denied).
    ProviderDenied {
        error: String,
        description: Option<String>,
    },
    MissingAuthState,
    InvalidAuthState,
    CsrfMismatch,
    MissingCode,
    TokenExchange(String),
    Profile(String),
    /// The membership check refused or failed.
    Gate(AuthzError),
    Persist(String),
}

impl LoginError {
    /// Logs the failure at a level that separates outages from denials.
    fn log(&self) {
        match self {
            Self::ProviderDenied { .. }
            | Self::MissingAuthState
            | Self::InvalidAuthState
            | Self::CsrfMismatch
            | Self::MissingCode => warn!(reason = %self, "login rejected"),
            // Already logged by the gate with group and upstream status.
            Self::Gate(e) => info!(reason = %e, user_message = e.user_message(), "login refused"),
            Self::TokenExchange(_) | Self::Profile(_) | Self::Persist(_) => {
                error!(reason = %self, "login failed")
            }
        }
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderDenied { error, description } => match description {
                Some(description) => write!(f, "provider returned '{error}': {description}"),
                None => write!(f, "provider returned '{error}'"),
            },
            Self::MissingAuthState => write!(f, "missing auth state cookie"),
            Self::InvalidAuthState => write!(f, "invalid auth state cookie"),
            Self::CsrfMismatch => write!(f, "CSRF token mismatch"),
            Self::MissingCode => write!(f, "missing authorization code"),
            Self::TokenExchange(msg) => write!(f, "token exchange failed: {msg}"),
            Self::Profile(msg) => write!(f, "failed to fetch Discord user: {msg}"),
            Self::Gate(e) => write!(f, "{e}"),
            Self::Persist(msg) => write!(f, "failed to save session: {msg}"),
        }
    }
}

impl std::error::Error for LoginError {}
