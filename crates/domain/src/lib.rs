//! Termbridge Domain - Core session types
//!
//! This crate defines the domain model for the terminology client's session
//! core: roles, profiles, sessions, route requirements and the view
//! projection. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod routing;
pub mod view;

pub use auth::{AuthError, AuthErrorKind, BearerToken, Role, Session, SessionState, UserProfile};
pub use config::ClientConfig;
pub use error::{DomainError, DomainResult};
pub use routing::{Access, Matcher, Route, RouteTable, normalize_path};
pub use view::ViewState;
