//! Configuration for the authorization gate.

use crate::identity::{GroupId, RoleId};
use std::time::Duration;

/// Upper bound on a single membership lookup.
pub const DEFAULT_MEMBERSHIP_TIMEOUT: Duration = Duration::from_secs(5);

/// Which guild and role a login must hold, and how long the gate waits for
/// the membership service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    group_id: GroupId,
    required_role_id: RoleId,
    membership_timeout: Duration,
}

impl GateConfig {
    /// Creates a configuration with the default membership timeout.
    #[must_use]
    pub fn new(group_id: GroupId, required_role_id: RoleId) -> Self {
        Self {
            group_id,
            required_role_id,
            membership_timeout: DEFAULT_MEMBERSHIP_TIMEOUT,
        }
    }

    /// Overrides the membership lookup timeout.
    #[must_use]
    pub fn with_membership_timeout(mut self, timeout: Duration) -> Self {
        self.membership_timeout = timeout;
        self
    }

    /// Returns the guild to look the user up in.
    #[must_use]
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Returns the role required for a session.
    #[must_use]
    pub fn required_role_id(&self) -> &RoleId {
        &self.required_role_id
    }

    /// Returns the membership lookup timeout.
    #[must_use]
    pub fn membership_timeout(&self) -> Duration {
        self.membership_timeout
    }
}
