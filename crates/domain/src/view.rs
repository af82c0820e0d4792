//! Projection of session state onto page sections.

use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Which sections and navigation entries are visible.
///
/// Derived purely from whether a session is active and the user's role;
/// projecting the same inputs twice yields the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    /// Login form.
    pub login_section: bool,
    /// Signed-in user's name, role and logout button.
    pub user_info_section: bool,
    /// Search, translate and FHIR panels.
    pub feature_sections: bool,
    /// Navigation link to the analytics dashboard.
    pub dashboard_link: bool,
    /// Navigation link to the audit log.
    pub audit_link: bool,
}

impl ViewState {
    /// Projects session status onto the page.
    #[must_use]
    pub fn project(authenticated: bool, role: Option<&Role>) -> Self {
        let role = role.filter(|_| authenticated);
        let at_least = |required: &Role| role.is_some_and(|held| held.satisfies(required));

        Self {
            login_section: !authenticated,
            user_info_section: authenticated,
            feature_sections: authenticated,
            dashboard_link: at_least(&Role::Researcher),
            audit_link: at_least(&Role::Auditor),
        }
    }

    /// View for an anonymous visitor.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::project(false, None)
    }
}
