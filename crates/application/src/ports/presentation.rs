//! Presentation ports
//!
//! The session services never render anything themselves. They report to
//! these capabilities and let the front end decide how a toast, spinner or
//! redirect looks.

use termbridge_domain::{UserProfile, ViewState};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// Neutral information.
    Info,
    /// An operation succeeded.
    Success,
    /// Something needs the user's attention.
    Warning,
    /// An operation failed.
    Error,
}

/// Shows short messages to the user.
pub trait NotificationSink: Send + Sync {
    /// Displays a notification.
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// Shows that a long-running call is in progress.
pub trait BusyIndicator: Send + Sync {
    /// Turns the indicator on or off.
    fn set_busy(&self, busy: bool);
}

/// Knows the current page and can move to another.
pub trait Navigator: Send + Sync {
    /// Path of the page currently shown.
    fn current_path(&self) -> String;

    /// Leaves the current page for `path`.
    fn redirect(&self, path: &str);
}

/// Applies a [`ViewState`] to whatever is on screen.
pub trait SessionView: Send + Sync {
    /// Renders the visible sections. `profile` is set when signed in.
    fn render(&self, view: &ViewState, profile: Option<&UserProfile>);
}
