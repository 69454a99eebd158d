//! Authenticated user model
//!
//! The identity reconstructed from the stored credential token on each
//! request. Created on login/token validation, cleared on logout; never
//! persisted beyond the token's lifetime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The authenticated identity bound to the current request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Backend identifier (patient or therapist id)
    pub id: String,
    /// Account role
    pub role: Role,
    /// Display name shown in the navigation bar
    pub display_name: String,
    /// Email address, when the backend echoes one
    pub email: Option<String>,
    /// Avatar reference (backend-served URL), if any
    pub avatar: Option<String>,
}

impl AuthenticatedUser {
    pub fn is_patient(&self) -> bool {
        self.role == Role::Patient
    }

    pub fn is_therapist(&self) -> bool {
        self.role == Role::Therapist
    }
}

/// Account role.
///
/// Determines which dashboard, settings and booking actions are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Patient - can browse therapists, book and cancel sessions
    Patient,
    /// Therapist - manages calendar, patients and profile
    Therapist,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Therapist => write!(f, "therapist"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "therapist" => Ok(Role::Therapist),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id: "p_000001".to_string(),
            role,
            display_name: "John Doe".to_string(),
            email: Some("john@example.com".to_string()),
            avatar: None,
        }
    }

    #[test]
    fn test_role_predicates() {
        assert!(make_user(Role::Patient).is_patient());
        assert!(!make_user(Role::Patient).is_therapist());
        assert!(make_user(Role::Therapist).is_therapist());
    }

    #[test]
    fn test_role_display_roundtrip() {
        assert_eq!(Role::from_str("patient").unwrap(), Role::Patient);
        assert_eq!(Role::from_str("THERAPIST").unwrap(), Role::Therapist);
        assert_eq!(Role::Patient.to_string(), "patient");
        assert!(Role::from_str("admin").is_err());
    }
}
