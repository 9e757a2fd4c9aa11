//! Guild membership records and the service that provides them.

use crate::error::MembershipQueryError;
use crate::identity::{AccessToken, GroupId, RoleId};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Roles a principal holds within one guild.
///
/// Fetched fresh for every login attempt and never cached. A missing or
/// `null` `roles` field decodes as an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MembershipRecord {
    #[serde(default, deserialize_with = "roles_or_empty")]
    roles: HashSet<RoleId>,
}

fn roles_or_empty<'de, D>(deserializer: D) -> Result<HashSet<RoleId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<HashSet<RoleId>>::deserialize(deserializer)?.unwrap_or_default())
}

impl MembershipRecord {
    /// Creates a record holding the given roles.
    #[must_use]
    pub fn from_roles(roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    /// Returns true if the record contains `role`.
    #[must_use]
    pub fn has_role(&self, role: &RoleId) -> bool {
        self.roles.contains(role)
    }

    /// Returns the roles held.
    #[must_use]
    pub fn roles(&self) -> &HashSet<RoleId> {
        &self.roles
    }
}

/// Looks up a bearer's roles within a guild.
///
/// Implementations perform exactly one lookup per call and never retry.
#[async_trait]
pub trait MembershipService: Send + Sync {
    /// Fetches the membership record of the token's owner in `group_id`.
    async fn fetch_membership(
        &self,
        group_id: &GroupId,
        token: &AccessToken,
    ) -> Result<MembershipRecord, MembershipQueryError>;
}

#[async_trait]
impl<T> MembershipService for Arc<T>
where
    T: MembershipService + ?Sized,
{
    async fn fetch_membership(
        &self,
        group_id: &GroupId,
        token: &AccessToken,
    ) -> Result<MembershipRecord, MembershipQueryError> {
        (**self).fetch_membership(group_id, token).await
    }
}
