//! Session inspection and the site password check.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use guild_gallery_access::{Session, SessionUser};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    app::AppState,
    auth::{CurrentSession, session_cookie},
    error::ApiError,
};

/// Snapshot of the caller's session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    has_session: bool,
    user: Option<SessionUser>,
    established_at: Option<DateTime<Utc>>,
    site_authenticated: bool,
}

/// Reports the caller's session state.
pub async fn session_info(CurrentSession(session): CurrentSession) -> Json<SessionInfo> {
    Json(match session {
        Some(session) => SessionInfo {
            has_session: true,
            user: session.user().cloned(),
            established_at: Some(session.established_at()),
            site_authenticated: session.site_authenticated(),
        },
        None => SessionInfo {
            has_session: false,
            user: None,
            established_at: None,
            site_authenticated: false,
        },
    })
}

/// Body of a site password check.
#[derive(Debug, Deserialize)]
pub struct VerifyPasswordRequest {
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
struct VerifyPasswordResponse {
    success: bool,
}

/// Marks the caller's session as site-authenticated if the password matches.
pub async fn verify_password(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
    Json(request): Json<VerifyPasswordRequest>,
) -> Result<Response, ApiError> {
    if !state.site_password.verify(&request.password) {
        warn!("site password rejected");
        return Err(ApiError::unauthorized("Invalid password"));
    }

    let mut session = session.unwrap_or_else(Session::anonymous);
    session.mark_site_authenticated();

    state
        .sessions
        .save(&session, state.session_config.ttl())
        .await
        .map_err(|e| {
            error!(session_id = %session.id(), error = %e, "failed to save session");
            ApiError::internal("Failed to save session.")
        })?;

    info!(session_id = %session.id(), "site password accepted");
    let jar = jar.add(session_cookie(session.id(), &state.session_config));
    Ok((jar, Json(VerifyPasswordResponse { success: true })).into_response())
}
