//! Error types for the access crate.
//!
//! - `MembershipQueryError`: why a membership lookup produced no record
//! - `AuthzError`: why a login attempt was refused a session
//! - `SessionStoreError`: session persistence failures, reported through
//!   rootcause at the store boundary

use crate::identity::{GroupId, RoleId};
use guild_gallery_core::SessionId;
use std::fmt;
use std::time::Duration;

/// Failure to obtain a membership record from the membership service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipQueryError {
    /// The service answered with a non-success status.
    Status { status: u16, body: String },
    /// The request never produced a response.
    Transport { details: String },
    /// The response body was empty or not a membership record.
    Malformed { details: String },
    /// No response arrived within the configured bound.
    Timeout { after: Duration },
}

impl MembershipQueryError {
    /// Returns the upstream HTTP status, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for MembershipQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => {
                write!(f, "membership service returned status {status}: {body}")
            }
            Self::Transport { details } => {
                write!(f, "membership service unreachable: {details}")
            }
            Self::Malformed { details } => {
                write!(f, "malformed membership response: {details}")
            }
            Self::Timeout { after } => {
                write!(f, "membership query timed out after {}ms", after.as_millis())
            }
        }
    }
}

impl std::error::Error for MembershipQueryError {}

/// Reason a login attempt was refused a session.
///
/// Every variant is terminal for the attempt. The detail is for operators;
/// end users only ever see [`AuthzError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The membership record could not be obtained.
    MembershipQueryFailed {
        group_id: GroupId,
        status: Option<u16>,
        detail: String,
    },
    /// Membership was confirmed but the required role is absent.
    RoleNotGranted {
        group_id: GroupId,
        required_role: RoleId,
    },
}

impl AuthzError {
    /// Returns the message safe to show to the end user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        "unauthorized"
    }

    /// Returns the guild the failed check was made against.
    #[must_use]
    pub fn group_id(&self) -> &GroupId {
        match self {
            Self::MembershipQueryFailed { group_id, .. } | Self::RoleNotGranted { group_id, .. } => {
                group_id
            }
        }
    }
}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MembershipQueryFailed {
                group_id,
                status: Some(status),
                detail,
            } => {
                write!(
                    f,
                    "membership query for guild {group_id} failed with status {status}: {detail}"
                )
            }
            Self::MembershipQueryFailed {
                group_id,
                status: None,
                detail,
            } => {
                write!(f, "membership query for guild {group_id} failed: {detail}")
            }
            Self::RoleNotGranted {
                group_id,
                required_role,
            } => {
                write!(f, "role {required_role} not granted in guild {group_id}")
            }
        }
    }
}

impl std::error::Error for AuthzError {}

/// Session persistence failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The backing store rejected or failed the operation.
    Backend { details: String },
    /// A stored session could not be decoded.
    Corrupt {
        session_id: SessionId,
        details: String,
    },
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { details } => write!(f, "session store error: {details}"),
            Self::Corrupt {
                session_id,
                details,
            } => write!(f, "stored session {session_id} is corrupt: {details}"),
        }
    }
}

impl std::error::Error for SessionStoreError {}
