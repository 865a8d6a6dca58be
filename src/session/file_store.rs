//! File-based session storage.
//!
//! Stores each slot as a plain file in a directory, the client-side
//! analog of the browser's local storage area.

use std::path::PathBuf;

use super::storage::CredentialStorage;
use crate::AuthError;

/// File-based session storage.
///
/// Each key is stored as a file named after the key in the configured
/// directory. Values are written verbatim: the credential slot holds
/// the raw token string, the identity slot a JSON document.
///
/// # Example
///
/// ```rust,ignore
/// use vestibule::session::FileCredentialStorage;
///
/// let storage = FileCredentialStorage::new("/var/lib/portal/session")?;
/// ```
pub struct FileCredentialStorage {
    directory: PathBuf,
}

impl FileCredentialStorage {
    /// Creates a new file storage area.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let dir = directory.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            AuthError::StorageError(format!("Failed to create storage directory: {e}"))
        })?;
        Ok(Self { directory: dir })
    }

    /// Returns the path for a storage key.
    fn slot_path(&self, key: &str) -> PathBuf {
        self.directory.join(key)
    }

    /// Keys name files directly, so restrict them to a safe alphabet.
    fn valid_key(key: &str) -> bool {
        !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

impl CredentialStorage for FileCredentialStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        if !Self::valid_key(key) {
            return Ok(None);
        }

        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| AuthError::StorageError(format!("Failed to read slot {key}: {e}")))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), AuthError> {
        if !Self::valid_key(key) {
            return Err(AuthError::StorageError(format!("Invalid storage key {key:?}")));
        }

        std::fs::write(self.slot_path(key), value)
            .map_err(|e| AuthError::StorageError(format!("Failed to write slot {key}: {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        if !Self::valid_key(key) {
            return Ok(());
        }

        let path = self.slot_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| AuthError::StorageError(format!("Failed to clear slot {key}: {e}")))?;
        }

        Ok(())
    }
}
