//! Login inputs supplied by the identity provider and the guild identifiers
//! they are checked against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Public profile of the principal that just completed the OAuth consent.
///
/// Supplied fresh for every login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    external_id: String,
    display_name: String,
    avatar_ref: Option<String>,
}

impl Identity {
    /// Creates an identity from provider profile fields.
    #[must_use]
    pub fn new(
        external_id: impl Into<String>,
        display_name: impl Into<String>,
        avatar_ref: Option<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            display_name: display_name.into(),
            avatar_ref,
        }
    }

    /// Returns the provider's stable user identifier.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Returns the name shown for the user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the provider's avatar reference, if the user has one.
    #[must_use]
    pub fn avatar_ref(&self) -> Option<&str> {
        self.avatar_ref.as_deref()
    }
}

/// Bearer credential returned by the OAuth token exchange.
///
/// Used once to query the membership service. Never persisted and never
/// printed.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

macro_rules! define_snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier from its string form.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_snowflake!(
    /// Identifier of the guild whose membership gates access.
    GroupId
);

define_snowflake!(
    /// Identifier of a role within a guild.
    RoleId
);
