//! Authentication errors

use thiserror::Error;

use super::Role;

/// Errors raised by the session core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server rejected the login.
    #[error("{message}")]
    InvalidCredentials {
        /// Server-supplied message, or a generic one.
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("network error: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },

    /// The session is missing or was rejected by the server.
    #[error("authentication required")]
    AuthRequired,

    /// The user's role ranks below the one a page requires.
    #[error("permission denied: {required} required, current role is {}", role_label(.actual.as_ref()))]
    PermissionDenied {
        /// Minimum role for the page.
        required: Role,
        /// Role of the current user, if any.
        actual: Option<Role>,
    },

    /// A success response could not be decoded.
    #[error("unexpected response: {message}")]
    Protocol {
        /// Decode error description.
        message: String,
    },

    /// Credentials could not be persisted.
    #[error("credential storage failed: {message}")]
    Storage {
        /// Storage error description.
        message: String,
    },

    /// The refresh endpoint answered with a non-success status.
    #[error("token refresh rejected with status {status}")]
    RefreshRejected {
        /// HTTP status code.
        status: u16,
    },

    /// The session was replaced or torn down while a refresh was in flight.
    #[error("session changed during refresh")]
    SessionChanged,
}

fn role_label(role: Option<&Role>) -> &str {
    role.map_or("none", Role::as_str)
}

/// Stable category names for [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// `invalid_credentials`
    InvalidCredentials,
    /// `network`
    Network,
    /// `auth_required`
    AuthRequired,
    /// `permission_denied`
    PermissionDenied,
    /// `protocol`
    Protocol,
    /// `storage`
    Storage,
    /// `refresh_rejected`
    RefreshRejected,
    /// `session_changed`
    SessionChanged,
}

impl AuthErrorKind {
    /// Returns the snake case name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::Network => "network",
            Self::AuthRequired => "auth_required",
            Self::PermissionDenied => "permission_denied",
            Self::Protocol => "protocol",
            Self::Storage => "storage",
            Self::RefreshRejected => "refresh_rejected",
            Self::SessionChanged => "session_changed",
        }
    }
}

impl AuthError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> AuthErrorKind {
        match self {
            Self::InvalidCredentials { .. } => AuthErrorKind::InvalidCredentials,
            Self::Network { .. } => AuthErrorKind::Network,
            Self::AuthRequired => AuthErrorKind::AuthRequired,
            Self::PermissionDenied { .. } => AuthErrorKind::PermissionDenied,
            Self::Protocol { .. } => AuthErrorKind::Protocol,
            Self::Storage { .. } => AuthErrorKind::Storage,
            Self::RefreshRejected { .. } => AuthErrorKind::RefreshRejected,
            Self::SessionChanged => AuthErrorKind::SessionChanged,
        }
    }

    /// Message suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials { message } => message.clone(),
            Self::Network { .. } => "Network error. Please try again.".to_string(),
            Self::AuthRequired => "Session expired. Please log in again.".to_string(),
            Self::PermissionDenied { required, .. } => {
                format!("Access denied. This page requires the {required} role or higher.")
            }
            Self::Protocol { .. } => "The server sent an unexpected response.".to_string(),
            Self::Storage { .. } => "Could not save your session.".to_string(),
            Self::RefreshRejected { .. } => "Could not extend your session.".to_string(),
            Self::SessionChanged => "Session changed. Please retry.".to_string(),
        }
    }
}
