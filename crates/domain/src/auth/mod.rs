//! Authentication domain types

mod error;
mod role;
mod types;

pub use error::{AuthError, AuthErrorKind};
pub use role::Role;
pub use types::{BearerToken, Session, SessionState, UserProfile};
