//! Access decisions derived from the session.

use std::sync::Arc;
use std::time::Duration;

use termbridge_domain::{AuthError, Role, RouteTable, SessionState, ViewState};
use tracing::{debug, info};

use super::{Presenter, SessionStore};
use crate::ports::NotificationLevel;

/// Decides what the current user may see and sends them away from what
/// they may not.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    store: SessionStore,
    routes: Arc<RouteTable>,
    presenter: Presenter,
    redirect_delay: Duration,
}

impl SessionGuard {
    /// Creates a guard over the given route table.
    #[must_use]
    pub fn new(store: SessionStore, routes: RouteTable, presenter: Presenter) -> Self {
        Self {
            store,
            routes: Arc::new(routes),
            presenter,
            redirect_delay: Duration::ZERO,
        }
    }

    /// Sets how long a permission-denied notice stays up before redirecting.
    #[must_use]
    pub const fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Session store.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Presentation capabilities.
    #[must_use]
    pub const fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// True iff token and profile are both stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// True if the stored profile ranks at least `required`.
    #[must_use]
    pub fn has_permission(&self, required: &Role) -> bool {
        self.store
            .profile()
            .is_some_and(|profile| profile.role.satisfies(required))
    }

    /// Checks the current page.
    ///
    /// Anonymous users on a protected page are redirected to the landing page
    /// and `false` is returned. Otherwise returns whether a session exists.
    #[must_use]
    pub fn require_auth(&self) -> bool {
        let authenticated = self.is_authenticated();
        let navigator = self.presenter.navigator();
        let path = navigator.current_path();

        if !authenticated && self.routes.is_protected(&path) {
            info!(%path, "anonymous visit to protected page, redirecting");
            navigator.redirect(self.routes.landing_page());
            return false;
        }
        authenticated
    }

    /// Full page guard for `path`, including the role requirement.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthRequired`] for anonymous users on a protected
    /// page and [`AuthError::PermissionDenied`] when the role ranks too low.
    /// Both cases redirect to the landing page, the latter after the
    /// configured delay.
    pub async fn require_access(&self, path: &str) -> Result<(), AuthError> {
        let access = self.routes.classify(path).clone();
        if !access.requires_auth() {
            return Ok(());
        }

        let navigator = self.presenter.navigator();
        if !self.is_authenticated() {
            info!(%path, "anonymous visit to protected page, redirecting");
            navigator.redirect(self.routes.landing_page());
            return Err(AuthError::AuthRequired);
        }

        if let Some(required) = access.required_role()
            && !self.has_permission(required)
        {
            let err = AuthError::PermissionDenied {
                required: required.clone(),
                actual: self.store.profile().map(|profile| profile.role),
            };
            info!(%path, error = %err, "insufficient role for page");
            self.presenter
                .notify(NotificationLevel::Warning, &err.user_message());
            tokio::time::sleep(self.redirect_delay).await;
            navigator.redirect(self.routes.landing_page());
            return Err(err);
        }

        debug!(%path, "page access granted");
        Ok(())
    }

    /// Projection of the current session onto the page sections.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        Self::project(&self.store.state())
    }

    /// Pushes the current projection to the view.
    pub fn render(&self) {
        let state = self.store.state();
        self.presenter
            .view()
            .render(&Self::project(&state), state.profile());
    }

    fn project(state: &SessionState) -> ViewState {
        ViewState::project(
            state.is_active(),
            state.profile().map(|profile| &profile.role),
        )
    }
}
