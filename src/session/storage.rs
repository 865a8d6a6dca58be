//! Durable session storage trait.

use crate::AuthError;

/// Storage key for the raw credential string.
pub const TOKEN_KEY: &str = "auth_token";

/// Storage key for the serialized identity document.
pub const IDENTITY_KEY: &str = "auth_user";

/// Durable key-value slots for the session.
///
/// The two keys above are written together on login, read together on
/// restore and cleared together on logout, and only ever by
/// [`SessionStore`](super::SessionStore) - no other component writes
/// them.
///
/// Operations are synchronous: restore must complete before any
/// protected route is evaluated, so storage reads cannot suspend.
///
/// Implementations:
/// - [`FileCredentialStorage`](super::FileCredentialStorage): one file
///   per key, survives restarts
/// - [`InMemoryCredentialStorage`](super::InMemoryCredentialStorage):
///   ephemeral, for tests
pub trait CredentialStorage: Send + Sync {
    /// Reads a slot. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// Writes a slot, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<(), AuthError>;

    /// Clears a slot. Clearing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}
