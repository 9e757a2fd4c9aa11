//! Session extractors for Axum.
//!
//! Page extractors redirect to the appropriate login step; API extractors
//! answer 401 instead.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use guild_gallery_access::{Session, SessionUser};
use std::sync::Arc;
use tracing::error;

use super::{SESSION_COOKIE, db::parse_session_id};
use crate::{app::AppState, error::ApiError};

/// Message returned by API routes that need a logged-in user.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Unauthorized. Please log in first.";

/// The live session named by the session cookie, if any.
///
/// Unknown, malformed and expired session cookies all yield `None`.
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::InternalError)?;

        let Some(session_id) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| parse_session_id(cookie.value()))
        else {
            return Ok(CurrentSession(None));
        };

        let session = app_state.sessions.load(session_id).await.map_err(|e| {
            error!(session_id = %session_id, error = %e, "failed to load session");
            AuthRejection::InternalError
        })?;

        Ok(CurrentSession(session))
    }
}

/// Extractor for pages that require a logged-in user.
///
/// Visitors without site access are sent to `/login`; site-authenticated
/// visitors are sent to the Discord login.
pub struct RequireUser(pub SessionUser);

impl<S> FromRequestParts<S> for RequireUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;

        match session {
            Some(session) => match session.user() {
                Some(user) => Ok(RequireUser(user.clone())),
                None if session.has_site_access() => Err(AuthRejection::LoginRequired),
                None => Err(AuthRejection::SiteLoginRequired),
            },
            None => Err(AuthRejection::SiteLoginRequired),
        }
    }
}

/// Extractor for API routes that require a logged-in user.
pub struct ApiUser(pub SessionUser);

impl<S> FromRequestParts<S> for ApiUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;

        session
            .as_ref()
            .and_then(Session::user)
            .cloned()
            .map(ApiUser)
            .ok_or(AuthRejection::Unauthorized)
    }
}

/// Extractor for API routes open to logged-in or site-authenticated visitors.
pub struct ApiSiteAccess(pub Session);

impl<S> FromRequestParts<S> for ApiSiteAccess
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;

        session
            .filter(Session::has_site_access)
            .map(ApiSiteAccess)
            .ok_or(AuthRejection::Unauthorized)
    }
}

/// Rejection type for session extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Needs a Discord login.
    LoginRequired,
    /// Needs the site password or a Discord login.
    SiteLoginRequired,
    /// API request without the required session.
    Unauthorized,
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::LoginRequired => Redirect::to("/auth/discord").into_response(),
            Self::SiteLoginRequired => Redirect::to("/login").into_response(),
            Self::Unauthorized => ApiError::unauthorized(LOGIN_REQUIRED_MESSAGE).into_response(),
            Self::InternalError => ApiError::internal("Internal server error").into_response(),
        }
    }
}
