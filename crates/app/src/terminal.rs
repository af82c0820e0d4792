//! Terminal front end for the session core.
//!
//! Notifications go to stderr so command output on stdout stays clean.

use std::io::{self, IsTerminal, Write};

use parking_lot::Mutex;
use termbridge_application::ports::{
    BusyIndicator, Navigator, NotificationLevel, NotificationSink, SessionView,
};
use termbridge_domain::{UserProfile, ViewState};

/// Notification sink, busy indicator, navigator and view for a terminal.
#[derive(Debug)]
pub struct Terminal {
    path: Mutex<String>,
    last_view: Mutex<Option<(ViewState, Option<UserProfile>)>>,
    interactive: bool,
}

impl Terminal {
    /// Creates a terminal front end positioned on `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
            last_view: Mutex::new(None),
            interactive: io::stderr().is_terminal(),
        }
    }

    /// Moves to `path` without reporting a redirect.
    pub fn visit(&self, path: &str) {
        *self.path.lock() = path.to_string();
    }

    /// Last projection handed to [`SessionView::render`].
    pub fn last_view(&self) -> Option<(ViewState, Option<UserProfile>)> {
        self.last_view.lock().clone()
    }
}

impl NotificationSink for Terminal {
    fn notify(&self, level: NotificationLevel, message: &str) {
        let tag = match level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{tag}] {message}");
    }
}

impl BusyIndicator for Terminal {
    fn set_busy(&self, busy: bool) {
        if !self.interactive {
            return;
        }
        let mut stderr = io::stderr().lock();
        // Best effort, the indicator is cosmetic.
        let _ = if busy {
            write!(stderr, "working...\r")
        } else {
            write!(stderr, "          \r")
        };
        let _ = stderr.flush();
    }
}

impl Navigator for Terminal {
    fn current_path(&self) -> String {
        self.path.lock().clone()
    }

    fn redirect(&self, path: &str) {
        eprintln!("-> {path}");
        self.visit(path);
    }
}

impl SessionView for Terminal {
    fn render(&self, view: &ViewState, profile: Option<&UserProfile>) {
        *self.last_view.lock() = Some((*view, profile.cloned()));
    }
}

/// Renders the view projection as one line per section.
pub fn describe_view(view: &ViewState) -> String {
    let flag = |shown: bool| if shown { "shown" } else { "hidden" };
    [
        ("login form", view.login_section),
        ("user info", view.user_info_section),
        ("features", view.feature_sections),
        ("dashboard link", view.dashboard_link),
        ("audit link", view.audit_link),
    ]
    .iter()
    .map(|(name, shown)| format!("  {name:<15}{}", flag(*shown)))
    .collect::<Vec<_>>()
    .join("\n")
}
