//! The authenticated user's profile and role set.

use serde::{Deserialize, Serialize};

/// Role label granting access to the admin area.
pub const ROLE_ADMIN: &str = "ADMIN";
/// Role label for regular portal users.
pub const ROLE_USER: &str = "USER";
/// Role label for enrolled students.
pub const ROLE_STUDENT: &str = "STUDENT";

/// The authenticated user's profile.
///
/// Received from the backend as part of a successful login, cached in
/// durable storage alongside the credential, and cleared whenever the
/// credential is cleared. All fields are mandatory; lenient defaulting
/// of older stored documents happens once, at the storage boundary
/// (see [`SessionStore::restore`](crate::session::SessionStore::restore)),
/// never in consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub active: bool,
    pub roles: Vec<String>,
}

impl Identity {
    /// Case-sensitive membership test against the role set.
    ///
    /// An identity with no matching role is a non-privileged user; there
    /// is no case folding and no alias handling.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns true if any of the given labels is held.
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    /// Returns true if the identity holds the `ADMIN` role.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Returns true if the identity holds a regular-user role.
    pub fn is_user(&self) -> bool {
        self.has_any_role(&[ROLE_USER, ROLE_STUDENT])
    }

    /// Display name assembled from the name parts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// Lenient deserialization shape for the stored identity document.
///
/// Storage may hold a document written by an older client that lacked
/// some fields; restore reconstructs a complete [`Identity`] with safe
/// defaults: username falls back to the email, `active` to true, names
/// and roles to empty.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredIdentity {
    id: String,
    #[serde(rename = "firstName", default)]
    first_name: String,
    #[serde(rename = "lastName", default)]
    last_name: String,
    email: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    roles: Vec<String>,
}

impl From<StoredIdentity> for Identity {
    fn from(stored: StoredIdentity) -> Self {
        let username = stored
            .username
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| stored.email.clone());

        Identity {
            id: stored.id,
            first_name: stored.first_name,
            last_name: stored.last_name,
            email: stored.email,
            username,
            active: stored.active.unwrap_or(true),
            roles: stored.roles,
        }
    }
}

#[cfg(test)]
pub(crate) fn mock_identity(username: &str, roles: &[&str]) -> Identity {
    Identity {
        id: "1".to_owned(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        email: format!("{username}@example.com"),
        username: username.to_owned(),
        active: true,
        roles: roles.iter().map(|r| (*r).to_owned()).collect(),
    }
}
