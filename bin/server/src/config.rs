//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested
//! fields use `__` as separator, e.g. `DISCORD__GUILD_ID`.

use guild_gallery_access::{GateConfig, GroupId, RoleId};
use guild_gallery_images::UploadPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Externally visible base URL, used to build image URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// PostgreSQL connection URL. Sessions are kept in memory when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Discord OAuth and guild gating configuration.
    pub discord: DiscordConfig,

    /// Image storage configuration.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Shared password that unlocks the gallery without a Discord login.
    #[serde(default)]
    pub site_password: Option<String>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Interval between expired session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_session_duration_minutes() -> i64 {
    7 * 24 * 60
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl SessionConfig {
    /// Session lifetime.
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.duration_minutes)
    }
}

/// Discord application and guild gating configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// OAuth2 client ID of the Discord application.
    pub client_id: String,
    /// OAuth2 client secret of the Discord application.
    pub client_secret: String,
    /// Callback URL registered with Discord, ending in `/auth/discord/callback`.
    pub redirect_uri: String,
    /// Scopes to request as a comma-separated string.
    #[serde(default = "default_scopes")]
    pub scopes: String,
    /// Discord authorization page.
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    /// Discord token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Base URL of the Discord REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Guild whose membership gates access.
    pub guild_id: String,
    /// Role a member must hold in the guild.
    pub required_role_id: String,
    /// Upper bound on the guild member lookup, in milliseconds.
    #[serde(default = "default_membership_timeout_ms")]
    pub membership_timeout_ms: u64,
}

fn default_scopes() -> String {
    "identify,guilds.members.read".to_string()
}

fn default_authorize_url() -> String {
    "https://discord.com/oauth2/authorize".to_string()
}

fn default_token_url() -> String {
    "https://discord.com/api/oauth2/token".to_string()
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_membership_timeout_ms() -> u64 {
    5_000
}

impl DiscordConfig {
    /// Returns the scopes, parsed from the comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Builds the authorization gate configuration.
    #[must_use]
    pub fn gate_config(&self) -> GateConfig {
        GateConfig::new(
            GroupId::new(self.guild_id.clone()),
            RoleId::new(self.required_role_id.clone()),
        )
        .with_membership_timeout(Duration::from_millis(self.membership_timeout_ms))
    }
}

/// Image storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    /// Directory images are stored in.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Accepted MIME types as a comma-separated string.
    #[serde(default = "default_allowed_types")]
    pub allowed_types: String,
}

fn default_storage_dir() -> String {
    "./data/images".to_string()
}

fn default_max_upload_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_allowed_types() -> String {
    "image/jpeg,image/png".to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_types: default_allowed_types(),
        }
    }
}

impl ImagesConfig {
    /// Builds the upload policy.
    #[must_use]
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            self.max_upload_bytes,
            self.allowed_types
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discord_json() -> serde_json::Value {
        serde_json::json!({
            "client_id": "client",
            "client_secret": "secret",
            "redirect_uri": "http://127.0.0.1:3000/auth/discord/callback",
            "guild_id": "614405243773386753",
            "required_role_id": "614416579475669014"
        })
    }

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.duration_minutes, 10_080);
        assert_eq!(config.cleanup_interval_seconds, 300);
        assert!(config.secure_cookies);
        assert_eq!(config.ttl(), chrono::Duration::days(7));
    }

    #[test]
    fn discord_config_deserializes_with_defaults() {
        let config: DiscordConfig = serde_json::from_value(discord_json()).expect("deserialize");

        assert_eq!(config.scopes(), vec!["identify", "guilds.members.read"]);
        assert_eq!(config.api_base_url, "https://discord.com/api/v10");
        assert_eq!(config.membership_timeout_ms, 5_000);

        let gate = config.gate_config();
        assert_eq!(gate.group_id().as_str(), "614405243773386753");
        assert_eq!(gate.required_role_id().as_str(), "614416579475669014");
        assert_eq!(gate.membership_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn images_config_builds_policy() {
        let config = ImagesConfig {
            allowed_types: "image/png, image/webp".to_string(),
            ..ImagesConfig::default()
        };
        let policy = config.upload_policy();
        assert_eq!(policy.max_bytes(), 2 * 1024 * 1024);
        assert_eq!(policy.allowed_types(), ["image/png", "image/webp"]);
    }

    #[test]
    fn server_config_requires_discord_section() {
        let result: Result<ServerConfig, _> = serde_json::from_value(serde_json::json!({}));
        assert!(result.is_err());

        let config: ServerConfig =
            serde_json::from_value(serde_json::json!({ "discord": discord_json() }))
                .expect("deserialize");
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert!(config.database_url.is_none());
        assert!(config.site_password.is_none());
    }
}
