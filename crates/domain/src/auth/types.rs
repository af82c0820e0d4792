//! Session and profile types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Role;

/// Opaque bearer credential issued by the terminology API.
///
/// The token's structure is never inspected. `Debug` output is redacted so
/// tokens do not leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the server handed out no token at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Get a preview of the token (first 8 chars + ...).
    #[must_use]
    pub fn preview(&self) -> String {
        if self.0.len() > 12 {
            let end = self
                .0
                .char_indices()
                .nth(8)
                .map_or(self.0.len(), |(idx, _)| idx);
            format!("{}...", &self.0[..end])
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&"<redacted>").finish()
    }
}

/// Profile of the signed-in user, as returned in `user_info` by the login
/// endpoint.
///
/// Field names on the wire follow the API (`name`, `abha_id`). The profile is
/// replaced wholesale on every login and never mutated in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account identifier, e.g. `DR001`.
    pub user_id: String,
    /// Human readable name.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Role used for access checks.
    pub role: Role,
    /// ABHA (health account) number.
    #[serde(rename = "abha_id", default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Facility the user belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    /// Clinical specialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    /// Creates a profile with only the fields access decisions depend on.
    #[must_use]
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role,
            external_id: None,
            facility: None,
            specialization: None,
            email: None,
        }
    }

    /// Sets the ABHA number.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

/// An authenticated session: a token and the profile it was issued for.
///
/// Both halves are always present together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Current bearer token.
    pub token: BearerToken,
    /// Profile captured at login.
    pub profile: UserProfile,
}

impl Session {
    /// Creates a new session.
    #[must_use]
    pub const fn new(token: BearerToken, profile: UserProfile) -> Self {
        Self { token, profile }
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No credentials stored.
    #[default]
    Anonymous,
    /// Token and profile stored.
    Active(Session),
}

impl SessionState {
    /// Builds the state from whatever halves of a session were found.
    ///
    /// A token without a profile (or the reverse) is not a session.
    #[must_use]
    pub fn from_parts(token: Option<BearerToken>, profile: Option<UserProfile>) -> Self {
        match (token, profile) {
            (Some(token), Some(profile)) => Self::Active(Session::new(token, profile)),
            _ => Self::Anonymous,
        }
    }

    /// Returns true for [`SessionState::Active`].
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Returns the profile of an active session.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Active(session) => Some(&session.profile),
            Self::Anonymous => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profile_decodes_login_user_info() {
        let json = r#"{
            "user_id": "DR001",
            "name": "Dr. Rajesh Kumar",
            "role": "practitioner",
            "abha_id": "12-3456-7890-1234",
            "facility": "AIIMS Delhi",
            "specialization": "N/A",
            "email": null
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.user_id, "DR001");
        assert_eq!(profile.display_name, "Dr. Rajesh Kumar");
        assert_eq!(profile.role, Role::Practitioner);
        assert_eq!(profile.external_id.as_deref(), Some("12-3456-7890-1234"));
        assert_eq!(profile.email, None);
    }

    #[test]
    fn test_profile_without_optional_fields() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"user_id":"AU1","name":"Audit","role":"auditor"}"#).unwrap();
        assert_eq!(profile, UserProfile::new("AU1", "Audit", Role::Auditor));

        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("abha_id"));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = BearerToken::new("very-secret-token-value");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret"));
        assert_eq!(token.authorization_header(), "Bearer very-secret-token-value");
    }

    #[test]
    fn test_empty_token() {
        assert!(BearerToken::new("").is_empty());
        assert!(!BearerToken::new("tok123").is_empty());
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(BearerToken::new("abcdefghijklmnop").preview(), "abcdefgh...");
        assert_eq!(BearerToken::new("short").preview(), "***");
    }

    #[test]
    fn test_session_state_requires_both_parts() {
        let profile = UserProfile::new("DR001", "Dr", Role::Practitioner);
        let token = BearerToken::new("tok123");

        assert!(!SessionState::from_parts(Some(token.clone()), None).is_active());
        assert!(!SessionState::from_parts(None, Some(profile.clone())).is_active());

        let state = SessionState::from_parts(Some(token), Some(profile.clone()));
        assert!(state.is_active());
        assert_eq!(state.profile(), Some(&profile));
    }
}
