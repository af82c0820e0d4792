//! Route access declarations.
//!
//! Every page the client can show is registered with the access it requires.
//! Guards look the requirement up here instead of pattern matching on paths
//! at the call site.

use crate::auth::Role;

/// Access requirement of a route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Access {
    /// Anyone may view the page.
    #[default]
    Public,
    /// Any signed-in user may view the page.
    Authenticated,
    /// Only users ranking at least this role may view the page.
    Role(Role),
}

impl Access {
    /// Returns true if the page redirects anonymous users away.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Minimum role for the page, if any.
    #[must_use]
    pub const fn required_role(&self) -> Option<&Role> {
        match self {
            Self::Role(role) => Some(role),
            Self::Public | Self::Authenticated => None,
        }
    }

    fn strictness(&self) -> u16 {
        match self {
            Self::Public => 0,
            Self::Authenticated => 1,
            Self::Role(role) => 2 + u16::from(role.rank()),
        }
    }
}

/// How a registered route is compared with a page path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// The route covers its path and everything below it, on whole segments.
    Prefix,
    /// The route covers every path containing its text, wherever the page
    /// is mounted.
    Marker,
}

/// A registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Normalised path prefix, or the marker text.
    pub path: String,
    /// How `path` is matched.
    pub matcher: Matcher,
    /// Requirement for every page the route covers.
    pub access: Access,
}

impl Route {
    fn covers(&self, path: &str) -> bool {
        match self.matcher {
            Matcher::Prefix => segment_prefix(&self.path, path),
            Matcher::Marker => path.contains(self.path.as_str()),
        }
    }
}

/// Registry of page access requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    landing_page: String,
    routes: Vec<Route>,
}

impl RouteTable {
    /// Creates an empty table redirecting to `landing_page`.
    #[must_use]
    pub fn new(landing_page: impl Into<String>) -> Self {
        Self {
            landing_page: landing_page.into(),
            routes: Vec::new(),
        }
    }

    /// The pages of the terminology client: any page whose path mentions
    /// the analytics dashboard needs a researcher, any page mentioning the
    /// audit log an auditor. Everything else is public.
    #[must_use]
    pub fn standard(landing_page: impl Into<String>) -> Self {
        Self::new(landing_page)
            .with_marker("dashboard", Access::Role(Role::Researcher))
            .with_marker("audit", Access::Role(Role::Auditor))
    }

    /// Registers a prefix route, replacing any earlier prefix registration
    /// of the same path.
    #[must_use]
    pub fn with_route(mut self, path: &str, access: Access) -> Self {
        self.register(path, access);
        self
    }

    /// Registers a marker route, replacing any earlier marker registration
    /// of the same text.
    #[must_use]
    pub fn with_marker(mut self, marker: &str, access: Access) -> Self {
        self.register_marker(marker, access);
        self
    }

    /// Registers a prefix route in place.
    pub fn register(&mut self, path: &str, access: Access) {
        self.insert(normalize_path(path), Matcher::Prefix, access);
    }

    /// Registers a marker route in place.
    pub fn register_marker(&mut self, marker: &str, access: Access) {
        self.insert(marker.trim_matches('/').to_string(), Matcher::Marker, access);
    }

    fn insert(&mut self, path: String, matcher: Matcher, access: Access) {
        self.routes
            .retain(|route| route.path != path || route.matcher != matcher);
        self.routes.push(Route {
            path,
            matcher,
            access,
        });
    }

    /// Page anonymous or under-privileged users are sent to.
    #[must_use]
    pub fn landing_page(&self) -> &str {
        &self.landing_page
    }

    /// Registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Looks up the requirement for `path`.
    ///
    /// Among prefix routes the most specific one wins. A prefix matches on
    /// whole segments only, so `/admin` covers `/admin/users` but not
    /// `/administer`. Marker routes can only tighten that result: when the
    /// path contains a marker stricter than the prefix match, the strictest
    /// such marker applies. Unregistered paths are public.
    #[must_use]
    pub fn classify(&self, path: &str) -> &Access {
        const PUBLIC: &Access = &Access::Public;

        let path = normalize_path(path);
        let by_prefix = self
            .routes
            .iter()
            .filter(|route| route.matcher == Matcher::Prefix && route.covers(&path))
            .max_by_key(|route| route.path.len())
            .map_or(PUBLIC, |route| &route.access);
        let by_marker = self
            .routes
            .iter()
            .filter(|route| route.matcher == Matcher::Marker && route.covers(&path))
            .map(|route| &route.access)
            .max_by_key(|access| access.strictness());

        match by_marker {
            Some(access) if access.strictness() > by_prefix.strictness() => access,
            _ => by_prefix,
        }
    }

    /// Returns true if `path` redirects anonymous users away.
    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        self.classify(path).requires_auth()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard("/")
    }
}

fn segment_prefix(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Normalises a page path for lookup.
///
/// Drops query string and fragment, a trailing `.html` and trailing slashes,
/// and ensures a leading slash.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.strip_suffix(".html").unwrap_or(path);
    let path = path.trim_end_matches('/');

    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
