//! Shared fixtures for route and client tests.

use axum::{
    Form, Json, Router,
    body::Body,
    extract::Path,
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get as route_get, post},
};
use guild_gallery_access::{MemorySessionStore, Session, SessionStore, SitePassword};
use guild_gallery_images::{FsBlobStore, Gallery, UploadPolicy};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    app::{AppState, router},
    auth::{AUTH_STATE_COOKIE, SESSION_COOKIE},
    config::{DiscordConfig, SessionConfig},
};

/// Local stand-in for the Discord OAuth and REST endpoints.
///
/// Authorization code `x` is exchanged for token `tok-x`; the token then
/// selects the guild member response:
/// - `tok-member`: holds the required role
/// - `tok-outsider`: member without the role
/// - `tok-broken`: HTTP 500
/// - `tok-slow`: answers after the gate timeout
/// - `tok-empty`: 200 with an empty body
/// - `tok-garbage`: 200 with a non-JSON body
pub struct FakeDiscord {
    pub base_url: String,
}

impl FakeDiscord {
    pub const GUILD_ID: &'static str = "614405243773386753";
    pub const ROLE_ID: &'static str = "614416579475669014";

    pub async fn spawn() -> Self {
        let app = Router::new()
            .route("/api/oauth2/token", post(token))
            .route("/api/v10/users/@me", route_get(current_user))
            .route(
                "/api/v10/users/@me/guilds/{guild_id}/member",
                route_get(guild_member),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake discord");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake discord");
        });

        Self {
            base_url: format!("http://{addr}"),
        }
    }

    pub fn api_base_url(&self) -> String {
        format!("{}/api/v10", self.base_url)
    }
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    match form.get("code").map(String::as_str) {
        Some("invalid") | None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response(),
        Some(code) => Json(json!({
            "access_token": format!("tok-{code}"),
            "token_type": "Bearer",
            "expires_in": 604800,
            "scope": "identify guilds.members.read",
        }))
        .into_response(),
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "401: Unauthorized", "code": 0 })),
    )
        .into_response()
}

async fn current_user(headers: HeaderMap) -> Response {
    match bearer(&headers).and_then(|t| t.strip_prefix("tok-")) {
        Some("member") => Json(json!({
            "id": "42",
            "username": "ada",
            "global_name": "Ada",
            "avatar": "a1b2c3",
        }))
        .into_response(),
        Some(name) => Json(json!({ "id": "7", "username": name, "avatar": null })).into_response(),
        None => unauthorized(),
    }
}

async fn guild_member(Path(guild_id): Path<String>, headers: HeaderMap) -> Response {
    if guild_id != FakeDiscord::GUILD_ID {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Unknown Guild" }))).into_response();
    }

    match bearer(&headers) {
        Some("tok-member") => {
            Json(json!({ "roles": [FakeDiscord::ROLE_ID, "111"], "nick": null })).into_response()
        }
        Some("tok-outsider") => Json(json!({ "roles": ["000"] })).into_response(),
        Some("tok-broken") => (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response(),
        Some("tok-slow") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "roles": [FakeDiscord::ROLE_ID] })).into_response()
        }
        Some("tok-empty") => StatusCode::OK.into_response(),
        Some("tok-garbage") => "<html>not json</html>".into_response(),
        _ => unauthorized(),
    }
}

/// Discord configuration pointing at `base_url`.
pub fn discord_config(base_url: &str) -> DiscordConfig {
    DiscordConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        redirect_uri: "http://localhost/auth/discord/callback".to_string(),
        scopes: "identify,guilds.members.read".to_string(),
        authorize_url: format!("{base_url}/oauth2/authorize"),
        token_url: format!("{base_url}/api/oauth2/token"),
        api_base_url: format!("{base_url}/api/v10"),
        guild_id: FakeDiscord::GUILD_ID.to_string(),
        required_role_id: FakeDiscord::ROLE_ID.to_string(),
        membership_timeout_ms: 200,
    }
}

/// A fully wired application against a fake Discord.
pub struct TestApp {
    pub state: Arc<AppState>,
    pub discord: FakeDiscord,
    _images: TempDir,
}

impl TestApp {
    pub const SITE_PASSWORD: &'static str = "open sesame";

    pub async fn spawn() -> Self {
        Self::spawn_with_sessions(Arc::new(MemorySessionStore::new())).await
    }

    pub async fn spawn_with_sessions(sessions: Arc<dyn SessionStore>) -> Self {
        let discord = FakeDiscord::spawn().await;
        let images = tempfile::tempdir().expect("tempdir");
        let store = FsBlobStore::open(images.path(), "http://localhost/blobs")
            .await
            .expect("blob store");

        let state = AppState::new(
            sessions,
            &discord_config(&discord.base_url),
            Gallery::new(store, UploadPolicy::default()),
            SessionConfig {
                duration_minutes: 60,
                cleanup_interval_seconds: 300,
                secure_cookies: false,
            },
            SitePassword::new(Some(Self::SITE_PASSWORD.to_string())),
        )
        .expect("app state");

        Self {
            state: Arc::new(state),
            discord,
            _images: images,
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Runs the whole Discord login with authorization code `code`.
    pub async fn complete_login(&self, code: &str) -> Response {
        self.complete_login_with_cookie(code, "").await
    }

    pub async fn complete_login_with_cookie(&self, code: &str, extra_cookie: &str) -> Response {
        let start = get(&self.router(), "/auth/discord").await;
        let csrf = location(&start)
            .split_once('?')
            .and_then(|(_, query)| query.split('&').find_map(|p| p.strip_prefix("state=")))
            .expect("state param")
            .to_string();
        let auth_state = cookie_value(&start, AUTH_STATE_COOKIE).expect("auth state cookie");

        let mut cookie = format!("{AUTH_STATE_COOKIE}={auth_state}");
        if !extra_cookie.is_empty() {
            cookie = format!("{cookie}; {extra_cookie}");
        }

        get_with_cookie(
            &self.router(),
            &format!("/auth/discord/callback?code={code}&state={csrf}"),
            &cookie,
        )
        .await
    }

    /// Logs in and returns the `session=...` cookie pair.
    pub async fn logged_in_cookie(&self, code: &str) -> String {
        let response = self.complete_login(code).await;
        let id = cookie_value(&response, SESSION_COOKIE).expect("session cookie");
        format!("{SESSION_COOKIE}={id}")
    }

    /// Stores an anonymous site-authenticated session and returns its cookie pair.
    pub async fn site_authenticated_cookie(&self) -> String {
        let mut session = Session::anonymous();
        session.mark_site_authenticated();
        self.state
            .sessions
            .save(&session, self.state.session_config.ttl())
            .await
            .expect("save session");
        format!("{SESSION_COOKIE}={}", session.id())
    }
}

pub async fn get(router: &Router, uri: &str) -> Response {
    get_with_cookie(router, uri, "").await
}

pub async fn get_with_cookie(router: &Router, uri: &str, cookie: &str) -> Response {
    send(router, request(Method::GET, uri, cookie).body(Body::empty())).await
}

pub async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    cookie: &str,
    body: Value,
) -> Response {
    let request = request(method, uri, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()));
    send(router, request).await
}

const BOUNDARY: &str = "guild-gallery-test-boundary";

/// Builds a single-part multipart body.
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POSTs a multipart body to the upload route.
pub async fn send_multipart(router: &Router, cookie: &str, body: Vec<u8>) -> Response {
    let request = request(Method::POST, "/api/images", cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body));
    send(router, request).await
}

fn request(method: Method, uri: &str, cookie: &str) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    if cookie.is_empty() {
        builder
    } else {
        builder.header(header::COOKIE, cookie)
    }
}

async fn send(router: &Router, request: Result<Request<Body>, axum::http::Error>) -> Response {
    router
        .clone()
        .oneshot(request.expect("request"))
        .await
        .expect("infallible")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value of the named cookie in the response's `Set-Cookie` headers.
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|cookie| {
        let pair = cookie.split(';').next()?;
        let (cookie_name, value) = pair.split_once('=')?;
        (cookie_name.trim() == name).then(|| value.trim().to_string())
    })
}
