//! The role check that decides whether a login yields a session.
//!
//! The gate only computes the decision. Persisting the resulting session is
//! the caller's job, through a [`SessionStore`](crate::SessionStore).

use crate::config::GateConfig;
use crate::error::{AuthzError, MembershipQueryError};
use crate::identity::{AccessToken, Identity};
use crate::membership::{MembershipRecord, MembershipService};
use crate::session::{Session, SessionUser};
use tracing::{error, info, instrument, warn};

/// Grants sessions to identities holding the configured guild role.
#[derive(Debug)]
pub struct AuthorizationGate<M> {
    membership: M,
    config: GateConfig,
}

impl<M> AuthorizationGate<M>
where
    M: MembershipService,
{
    /// Creates a gate over the given membership service.
    #[must_use]
    pub fn new(membership: M, config: GateConfig) -> Self {
        Self { membership, config }
    }

    /// Returns the gate configuration.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Decides whether `identity` may hold an authenticated session.
    ///
    /// Queries the membership service exactly once, bounded by the
    /// configured timeout. Dropping the returned future abandons the query.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::MembershipQueryFailed`] if no membership record
    /// could be obtained, and [`AuthzError::RoleNotGranted`] if the record
    /// lacks the required role.
    #[instrument(
        skip_all,
        fields(
            group_id = %self.config.group_id(),
            external_id = %identity.external_id(),
        )
    )]
    pub async fn authorize(
        &self,
        identity: &Identity,
        token: &AccessToken,
    ) -> Result<Session, AuthzError> {
        let record = self.query_membership(token).await?;

        if !record.has_role(self.config.required_role_id()) {
            warn!(
                required_role = %self.config.required_role_id(),
                held_roles = record.roles().len(),
                "required role not granted"
            );
            return Err(AuthzError::RoleNotGranted {
                group_id: self.config.group_id().clone(),
                required_role: self.config.required_role_id().clone(),
            });
        }

        info!(display_name = %identity.display_name(), "required role present");
        Ok(Session::authorized(SessionUser::from_identity(identity)))
    }

    async fn query_membership(&self, token: &AccessToken) -> Result<MembershipRecord, AuthzError> {
        let timeout = self.config.membership_timeout();
        let lookup = self
            .membership
            .fetch_membership(self.config.group_id(), token);

        let result = match tokio::time::timeout(timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(MembershipQueryError::Timeout { after: timeout }),
        };

        result.map_err(|e| {
            error!(
                status = ?e.status(),
                error = %e,
                "membership query failed"
            );
            AuthzError::MembershipQueryFailed {
                group_id: self.config.group_id().clone(),
                status: e.status(),
                detail: e.to_string(),
            }
        })
    }
}
