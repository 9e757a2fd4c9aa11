//! Session values.
//!
//! A session is either anonymous (possibly unlocked with the site password)
//! or carries a `SessionUser`, which only exists after a successful role
//! check.

use chrono::{DateTime, Utc};
use guild_gallery_core::SessionId;
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// The authorized principal recorded in a session.
///
/// There is no public constructor: values come from
/// [`AuthorizationGate::authorize`](crate::AuthorizationGate::authorize) or
/// from deserializing a session that was persisted after one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    external_id: String,
    display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_ref: Option<String>,
}

impl SessionUser {
    pub(crate) fn from_identity(identity: &Identity) -> Self {
        Self {
            external_id: identity.external_id().to_string(),
            display_name: identity.display_name().to_string(),
            avatar_ref: identity.avatar_ref().map(str::to_string),
        }
    }

    /// Returns the provider's user identifier.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Returns the display name captured at login.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the avatar reference captured at login.
    #[must_use]
    pub fn avatar_ref(&self) -> Option<&str> {
        self.avatar_ref.as_deref()
    }
}

/// The application's record of a visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    user: Option<SessionUser>,
    established_at: DateTime<Utc>,
    site_authenticated: bool,
}

impl Session {
    /// Creates a session with no user attached.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            id: SessionId::new(),
            user: None,
            established_at: Utc::now(),
            site_authenticated: false,
        }
    }

    pub(crate) fn authorized(user: SessionUser) -> Self {
        Self {
            id: SessionId::new(),
            user: Some(user),
            established_at: Utc::now(),
            site_authenticated: false,
        }
    }

    /// Reconstitutes a session loaded from storage.
    #[must_use]
    pub fn restore(
        id: SessionId,
        user: Option<SessionUser>,
        established_at: DateTime<Utc>,
        site_authenticated: bool,
    ) -> Self {
        Self {
            id,
            user,
            established_at,
            site_authenticated,
        }
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the authorized user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Returns when the session was established.
    #[must_use]
    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    /// Returns true if the site password was accepted for this session.
    #[must_use]
    pub fn site_authenticated(&self) -> bool {
        self.site_authenticated
    }

    /// Returns true if a role-checked user is attached.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Returns true if the visitor may see site pages.
    #[must_use]
    pub fn has_site_access(&self) -> bool {
        self.is_logged_in() || self.site_authenticated
    }

    /// Records that the site password was accepted.
    pub fn mark_site_authenticated(&mut self) {
        self.site_authenticated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_has_no_access() {
        let session = Session::anonymous();
        assert!(session.user().is_none());
        assert!(!session.is_logged_in());
        assert!(!session.has_site_access());
    }

    #[test]
    fn site_password_grants_site_access_only() {
        let mut session = Session::anonymous();
        session.mark_site_authenticated();
        assert!(session.has_site_access());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn authorized_session_copies_identity() {
        let identity = Identity::new("42", "Ada", Some("abc".to_string()));
        let session = Session::authorized(SessionUser::from_identity(&identity));
        let user = session.user().expect("user present");
        assert_eq!(user.external_id(), "42");
        assert_eq!(user.display_name(), "Ada");
        assert_eq!(user.avatar_ref(), Some("abc"));
        assert!(session.has_site_access());
    }

    #[test]
    fn each_session_gets_a_fresh_id() {
        assert_ne!(Session::anonymous().id(), Session::anonymous().id());
    }

    #[test]
    fn session_user_serializes_camel_case() {
        let identity = Identity::new("42", "Ada", None);
        let user = SessionUser::from_identity(&identity);
        let json = serde_json::to_value(&user).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"externalId": "42", "displayName": "Ada"})
        );
        let parsed: SessionUser = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, user);
    }

    #[test]
    fn restore_preserves_fields() {
        let identity = Identity::new("42", "Ada", None);
        let original = Session::authorized(SessionUser::from_identity(&identity));
        let restored = Session::restore(
            original.id(),
            original.user().cloned(),
            original.established_at(),
            true,
        );
        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.user(), original.user());
        assert!(restored.site_authenticated());
    }
}
