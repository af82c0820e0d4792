//! Roles and the rank hierarchy used for access checks.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A user role as reported by the terminology API.
///
/// Roles form a total order (see [`Role::rank`]). Access checks only ever
/// compare ranks with `>=`; two roles are never compared for equality to
/// grant access.
///
/// Role strings the client does not recognise are preserved in
/// [`Role::Unrecognized`] and rank `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Clinician using search and translation.
    Practitioner,
    /// May additionally view the analytics dashboard.
    Researcher,
    /// May additionally browse audit logs.
    Auditor,
    /// Full access.
    Admin,
    /// Any role string outside the hierarchy.
    Unrecognized(String),
}

impl Role {
    /// Ranked roles, lowest first.
    pub const RANKED: [Self; 4] = [
        Self::Practitioner,
        Self::Researcher,
        Self::Auditor,
        Self::Admin,
    ];

    /// Position in the hierarchy. Unrecognised roles rank `0`.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Practitioner => 1,
            Self::Researcher => 2,
            Self::Auditor => 3,
            Self::Admin => 4,
            Self::Unrecognized(_) => 0,
        }
    }

    /// Returns true if this role is at least as privileged as `required`.
    #[must_use]
    pub const fn satisfies(&self, required: &Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Wire representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Practitioner => "practitioner",
            Self::Researcher => "researcher",
            Self::Auditor => "auditor",
            Self::Admin => "admin",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "practitioner" => Self::Practitioner,
            "researcher" => Self::Researcher,
            "auditor" => Self::Auditor,
            "admin" => Self::Admin,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_table() {
        assert_eq!(Role::Practitioner.rank(), 1);
        assert_eq!(Role::Researcher.rank(), 2);
        assert_eq!(Role::Auditor.rank(), 3);
        assert_eq!(Role::Admin.rank(), 4);
        assert_eq!(Role::Unrecognized("nurse".to_string()).rank(), 0);
    }

    #[test]
    fn test_ranked_is_strictly_increasing() {
        for pair in Role::RANKED.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn test_satisfies_is_monotonic() {
        for held in &Role::RANKED {
            for (i, required) in Role::RANKED.iter().enumerate() {
                if held.satisfies(required) {
                    for lower in &Role::RANKED[..i] {
                        assert!(held.satisfies(lower), "{held} >= {required} but not {lower}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_unrecognized_only_satisfies_unranked() {
        let unknown = Role::Unrecognized("guest".to_string());
        assert!(!unknown.satisfies(&Role::Practitioner));
        assert!(unknown.satisfies(&Role::Unrecognized("other".to_string())));
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        let json = serde_json::to_string(&Role::Auditor).unwrap();
        assert_eq!(json, "\"auditor\"");

        let role: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(role, Role::Unrecognized("superuser".to_string()));
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"superuser\"");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(
            "Admin".parse::<Role>().unwrap(),
            Role::Unrecognized("Admin".to_string())
        );
    }
}
