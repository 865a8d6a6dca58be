//! In-memory session storage.
//!
//! Suitable for tests and runs that should not persist a session.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::storage::CredentialStorage;
use crate::AuthError;

/// In-memory session storage.
///
/// Stores slots in a `HashMap` protected by a `RwLock`.
///
/// # Note
///
/// Contents are lost when the process exits. For a session that
/// survives restarts, use
/// [`FileCredentialStorage`](super::FileCredentialStorage).
#[derive(Clone, Default)]
pub struct InMemoryCredentialStorage {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCredentialStorage {
    /// Creates a new in-memory storage area.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns true if no slots are occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStorage for InMemoryCredentialStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_owned()))?;

        Ok(slots.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.slots
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_owned()))?
            .insert(key.to_owned(), value.to_owned());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.slots
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_owned()))?
            .remove(key);

        Ok(())
    }
}
