//! Session state: the pairing of a credential and its identity.
//!
//! [`SessionStore`] is the single owner and the only writer of durable
//! session storage; everything else reads through snapshots or the
//! identity stream.

mod file_store;
mod memory_store;
mod storage;
mod store;

use std::fmt;

pub use file_store::FileCredentialStorage;
pub use memory_store::InMemoryCredentialStorage;
pub use storage::{CredentialStorage, IDENTITY_KEY, TOKEN_KEY};
pub use store::SessionStore;

use crate::identity::Identity;

/// A live session: the raw bearer credential and the identity it
/// belongs to.
#[derive(Clone)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

impl Session {
    pub fn new(token: String, identity: Identity) -> Self {
        Self { token, identity }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("identity", &self.identity)
            .finish()
    }
}

/// A synchronous view of the session at one instant.
///
/// The route guard consumes this instead of the store itself so that
/// navigation decisions stay pure and never suspend. `authenticated`
/// is computed at snapshot time: identity present and credential not
/// yet expired.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    identity: Option<Identity>,
    authenticated: bool,
}

impl SessionSnapshot {
    /// Snapshot of an anonymous session.
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            authenticated: false,
        }
    }

    /// Snapshot of an authenticated session.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            authenticated: true,
        }
    }

    /// The identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// True when an unexpired credential was present at snapshot time.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Case-sensitive role membership; false for an anonymous session.
    pub fn has_role(&self, role: &str) -> bool {
        self.authenticated
            && self
                .identity
                .as_ref()
                .is_some_and(|identity| identity.has_role(role))
    }

    /// True when the session holds the `ADMIN` role.
    pub fn is_admin(&self) -> bool {
        self.has_role(crate::identity::ROLE_ADMIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::mock_identity;

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("aaa.bbb.ccc".to_owned(), mock_identity("amalia", &[]));
        let debug = format!("{session:?}");

        assert!(!debug.contains("aaa.bbb.ccc"));
        assert!(debug.contains("amalia"));
    }

    #[test]
    fn test_anonymous_snapshot_denies_every_role() {
        let snapshot = SessionSnapshot::anonymous();

        assert!(!snapshot.is_authenticated());
        assert!(snapshot.identity().is_none());
        assert!(!snapshot.has_role("ADMIN"));
        assert!(!snapshot.has_role(""));
        assert!(!snapshot.is_admin());
    }

    #[test]
    fn test_authenticated_snapshot_role_checks() {
        let snapshot = SessionSnapshot::authenticated(mock_identity("amalia", &["ADMIN"]));

        assert!(snapshot.is_authenticated());
        assert!(snapshot.has_role("ADMIN"));
        assert!(snapshot.is_admin());
        assert!(!snapshot.has_role("USER"));
    }
}
