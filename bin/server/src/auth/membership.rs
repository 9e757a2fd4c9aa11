//! Discord guild member lookups.

use async_trait::async_trait;
use guild_gallery_access::{
    AccessToken, GroupId, MembershipQueryError, MembershipRecord, MembershipService,
};
use tracing::{debug, instrument};

/// Longest upstream error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 512;

/// Queries `/users/@me/guilds/{guild}/member` with the user's token.
#[derive(Debug, Clone)]
pub struct DiscordMembershipClient {
    api_base_url: String,
    http: reqwest::Client,
}

impl DiscordMembershipClient {
    /// Creates a client for the given Discord API base URL.
    pub fn new(api_base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[async_trait]
impl MembershipService for DiscordMembershipClient {
    #[instrument(skip_all, fields(group_id = %group_id))]
    async fn fetch_membership(
        &self,
        group_id: &GroupId,
        token: &AccessToken,
    ) -> Result<MembershipRecord, MembershipQueryError> {
        let url = format!(
            "{}/users/@me/guilds/{}/member",
            self.api_base_url,
            group_id.as_str()
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| MembershipQueryError::Transport {
                details: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| MembershipQueryError::Transport {
                details: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(MembershipQueryError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(MembershipQueryError::Malformed {
                details: "empty response body".to_string(),
            });
        }

        let record: MembershipRecord =
            serde_json::from_slice(&body).map_err(|e| MembershipQueryError::Malformed {
                details: e.to_string(),
            })?;

        debug!(role_count = record.roles().len(), "fetched guild membership");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeDiscord;
    use guild_gallery_access::RoleId;

    async fn fetch(token: &str) -> Result<MembershipRecord, MembershipQueryError> {
        let discord = FakeDiscord::spawn().await;
        let client = DiscordMembershipClient::new(discord.api_base_url(), reqwest::Client::new());
        client
            .fetch_membership(&GroupId::new(FakeDiscord::GUILD_ID), &AccessToken::new(token))
            .await
    }

    #[tokio::test]
    async fn member_roles_are_returned() {
        let record = fetch("tok-member").await.expect("record");
        assert!(record.has_role(&RoleId::new(FakeDiscord::ROLE_ID)));
    }

    #[tokio::test]
    async fn outsider_has_no_required_role() {
        let record = fetch("tok-outsider").await.expect("record");
        assert!(!record.has_role(&RoleId::new(FakeDiscord::ROLE_ID)));
    }

    #[tokio::test]
    async fn server_error_is_status_failure() {
        let err = fetch("tok-broken").await.expect_err("500");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn unknown_token_is_status_failure() {
        let err = fetch("tok-nobody").await.expect_err("401");
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn empty_body_is_malformed() {
        let err = fetch("tok-empty").await.expect_err("empty");
        assert!(matches!(err, MembershipQueryError::Malformed { .. }));
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let err = fetch("tok-garbage").await.expect_err("garbage");
        assert!(matches!(err, MembershipQueryError::Malformed { .. }));
    }

    #[tokio::test]
    async fn unreachable_api_is_transport_failure() {
        let client =
            DiscordMembershipClient::new("http://127.0.0.1:1/api/v10", reqwest::Client::new());
        let err = client
            .fetch_membership(&GroupId::new("1"), &AccessToken::new("tok"))
            .await
            .expect_err("unreachable");
        assert!(matches!(err, MembershipQueryError::Transport { .. }));
    }
}
