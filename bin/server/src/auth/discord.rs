//! Discord OAuth 2.0 login client.
//!
//! Handles the provider side of the login flow:
//! - building the authorization URL (CSRF state and PKCE)
//! - exchanging the authorization code for an access token
//! - fetching the Discord user behind the token

use guild_gallery_access::{AccessToken, Identity};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EmptyExtraTokenFields,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, StandardTokenResponse, TokenResponse,
    TokenUrl,
    basic::{BasicClient, BasicTokenType},
};
use serde::Deserialize;
use std::fmt;
use tracing::instrument;

use crate::config::DiscordConfig;

/// Type alias for the token response type.
type DiscordTokenResponse = StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>;

/// Discord OAuth client configuration.
#[derive(Clone)]
pub struct DiscordOAuthClient {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    scopes: Vec<String>,
    api_base_url: String,
    http: reqwest::Client,
}

/// State kept in a cookie between the redirect and the callback.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DiscordAuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
}

/// Discord user object, as returned by `/users/@me`.
#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    #[serde(default)]
    avatar: Option<String>,
}

impl DiscordOAuthClient {
    /// Creates a new Discord OAuth client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is invalid.
    pub fn new(config: &DiscordConfig) -> Result<Self, DiscordOAuthError> {
        let auth_url = AuthUrl::new(config.authorize_url.clone())
            .map_err(|e| DiscordOAuthError::Configuration(format!("invalid authorize URL: {e}")))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| DiscordOAuthError::Configuration(format!("invalid token URL: {e}")))?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| DiscordOAuthError::Configuration(format!("invalid redirect URI: {e}")))?;

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                DiscordOAuthError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client_id: ClientId::new(config.client_id.clone()),
            client_secret: ClientSecret::new(config.client_secret.clone()),
            auth_url,
            token_url,
            redirect_url,
            scopes: config.scopes().into_iter().map(str::to_string).collect(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Returns the HTTP client used for Discord requests.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Generates the authorization URL for redirecting the user.
    ///
    /// Returns the URL along with the state to keep for the callback.
    pub fn authorization_url(&self) -> (String, DiscordAuthState) {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        let state = DiscordAuthState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), state)
    }

    /// Exchanges the authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint rejects the code.
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<AccessToken, DiscordOAuthError> {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let token_result: DiscordTokenResponse = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| DiscordOAuthError::TokenExchange(format!("token exchange failed: {e}")))?;

        Ok(AccessToken::new(token_result.access_token().secret().clone()))
    }

    /// Fetches the Discord user the token belongs to.
    ///
    /// The Discord username becomes the display name: it is unique, which
    /// keeps per-user image prefixes from colliding.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a user.
    #[instrument(skip_all)]
    pub async fn fetch_identity(&self, token: &AccessToken) -> Result<Identity, DiscordOAuthError> {
        let response = self
            .http
            .get(format!("{}/users/@me", self.api_base_url))
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| DiscordOAuthError::Profile(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscordOAuthError::Profile(format!(
                "/users/@me returned status {status}"
            )));
        }

        let user: DiscordUser = response
            .json()
            .await
            .map_err(|e| DiscordOAuthError::Profile(format!("invalid user object: {e}")))?;

        Ok(Identity::new(user.id, user.username, user.avatar))
    }
}

/// Discord OAuth errors.
#[derive(Debug)]
pub enum DiscordOAuthError {
    /// Configuration error.
    Configuration(String),
    /// Token exchange failed.
    TokenExchange(String),
    /// The user profile could not be fetched.
    Profile(String),
}

impl fmt::Display for DiscordOAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Discord OAuth configuration error: {msg}"),
            Self::TokenExchange(msg) => write!(f, "Discord token exchange error: {msg}"),
            Self::Profile(msg) => write!(f, "Discord profile error: {msg}"),
        }
    }
}

impl std::error::Error for DiscordOAuthError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeDiscord, discord_config};

    #[test]
    fn authorization_url_carries_client_scopes_and_pkce() {
        let client =
            DiscordOAuthClient::new(&discord_config("http://discord.test")).expect("client");

        let (url, state) = client.authorization_url();

        assert!(url.starts_with("http://discord.test/oauth2/authorize?"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("scope=identify+guilds.members.read"));
        assert!(url.contains(&format!("state={}", state.csrf_token)));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(!state.pkce_verifier.is_empty());
    }

    #[test]
    fn invalid_redirect_uri_is_rejected() {
        let mut config = discord_config("http://discord.test");
        config.redirect_uri = "not a url".to_string();
        assert!(matches!(
            DiscordOAuthClient::new(&config),
            Err(DiscordOAuthError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn exchanges_code_and_fetches_identity() {
        let discord = FakeDiscord::spawn().await;
        let client = DiscordOAuthClient::new(&discord_config(&discord.base_url)).expect("client");

        let token = client
            .exchange_code("member", "verifier")
            .await
            .expect("exchange");
        assert_eq!(token.secret(), "tok-member");

        let identity = client.fetch_identity(&token).await.expect("identity");
        assert_eq!(identity.external_id(), "42");
        assert_eq!(identity.display_name(), "ada");
        assert_eq!(identity.avatar_ref(), Some("a1b2c3"));
    }

    #[tokio::test]
    async fn rejected_code_is_exchange_error() {
        let discord = FakeDiscord::spawn().await;
        let client = DiscordOAuthClient::new(&discord_config(&discord.base_url)).expect("client");

        let err = client
            .exchange_code("invalid", "verifier")
            .await
            .expect_err("rejected");
        assert!(matches!(err, DiscordOAuthError::TokenExchange(_)));
    }
}
