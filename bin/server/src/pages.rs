//! Page routes.
//!
//! Pages answer with JSON; rendering is left to the client.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use guild_gallery_access::SessionUser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    app::AppState,
    auth::{CurrentSession, RequireUser},
    error::ApiError,
};

/// Reported for any `?error=` value.
const LOGIN_FAILED_MESSAGE: &str = "unauthorized";

/// Query parameters accepted by the home page.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    error: Option<String>,
}

/// Home page.
///
/// Logged-in users get their profile. A failed login (`?error=`) without
/// a user answers 401.
pub async fn home(
    CurrentSession(session): CurrentSession,
    Query(query): Query<HomeQuery>,
) -> Response {
    if let Some(user) = session.as_ref().and_then(|s| s.user()) {
        return Json(user.clone()).into_response();
    }

    if query.error.is_some() {
        return ApiError::unauthorized(LOGIN_FAILED_MESSAGE).into_response();
    }

    if session.is_some_and(|s| s.has_site_access()) {
        Redirect::to("/auth/discord").into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

/// Dashboard page.
pub async fn dashboard(RequireUser(user): RequireUser) -> Json<SessionUser> {
    Json(user)
}

/// What the login page offers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOptions {
    pub site_password_enabled: bool,
    pub site_authenticated: bool,
    pub discord_login_url: &'static str,
}

/// Login page; always reachable.
pub async fn login(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Json<LoginOptions> {
    Json(LoginOptions {
        site_password_enabled: state.site_password.is_configured(),
        site_authenticated: session.is_some_and(|s| s.has_site_access()),
        discord_login_url: "/auth/discord",
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, body_json, get, get_with_cookie, location};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn anonymous_visitor_is_sent_to_login() {
        let app = TestApp::spawn().await;
        let response = get(&app.router(), "/").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn site_authenticated_visitor_is_sent_to_discord() {
        let app = TestApp::spawn().await;
        let cookie = app.site_authenticated_cookie().await;

        let response = get_with_cookie(&app.router(), "/dashboard", &cookie).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/discord");
    }

    #[tokio::test]
    async fn failed_login_lands_on_unauthorized() {
        let app = TestApp::spawn().await;
        let response = get(&app.router(), "/?error=unauthorized").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["statusMessage"], "unauthorized");
    }

    #[tokio::test]
    async fn error_parameter_text_is_not_echoed() {
        let app = TestApp::spawn().await;
        let response = get(&app.router(), "/?error=Your%20account%20is%20banned").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["statusMessage"], "unauthorized");
    }

    #[tokio::test]
    async fn logged_in_user_sees_profile() {
        let app = TestApp::spawn().await;
        let cookie = app.logged_in_cookie("member").await;

        let response = get_with_cookie(&app.router(), "/dashboard", &cookie).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["externalId"], "42");
        assert_eq!(body["displayName"], "ada");
    }

    #[tokio::test]
    async fn login_page_reports_site_password() {
        let app = TestApp::spawn().await;
        let response = get(&app.router(), "/login").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sitePasswordEnabled"], true);
        assert_eq!(body["siteAuthenticated"], false);
    }
}
