//! Bundle of presentation capabilities handed to the session services.

use std::fmt;
use std::sync::Arc;

use crate::ports::{BusyIndicator, Navigator, NotificationLevel, NotificationSink, SessionView};

/// The front-end capabilities the session core reports to.
#[derive(Clone)]
pub struct Presenter {
    notifier: Arc<dyn NotificationSink>,
    busy: Arc<dyn BusyIndicator>,
    navigator: Arc<dyn Navigator>,
    view: Arc<dyn SessionView>,
}

impl Presenter {
    /// Creates a presenter from its parts.
    #[must_use]
    pub fn new(
        notifier: Arc<dyn NotificationSink>,
        busy: Arc<dyn BusyIndicator>,
        navigator: Arc<dyn Navigator>,
        view: Arc<dyn SessionView>,
    ) -> Self {
        Self {
            notifier,
            busy,
            navigator,
            view,
        }
    }

    /// Notification sink.
    #[must_use]
    pub fn notifier(&self) -> &dyn NotificationSink {
        self.notifier.as_ref()
    }

    /// Navigation.
    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Session view renderer.
    #[must_use]
    pub fn view(&self) -> &dyn SessionView {
        self.view.as_ref()
    }

    /// Shorthand for [`NotificationSink::notify`].
    pub fn notify(&self, level: NotificationLevel, message: &str) {
        self.notifier.notify(level, message);
    }

    /// Turns the busy indicator on until the returned guard is dropped.
    #[must_use = "the indicator turns off when the guard is dropped"]
    pub fn busy(&self) -> BusyGuard<'_> {
        self.busy.set_busy(true);
        BusyGuard {
            indicator: self.busy.as_ref(),
        }
    }
}

impl fmt::Debug for Presenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presenter").finish_non_exhaustive()
    }
}

/// Keeps the busy indicator on while alive.
pub struct BusyGuard<'a> {
    indicator: &'a dyn BusyIndicator,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.set_busy(false);
    }
}
