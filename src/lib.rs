//! Client-side session management for REST portal frontends.
//!
//! `vestibule` tracks the one piece of shared mutable state a portal
//! client has: the current session (bearer credential plus identity).
//! It validates credential expiry locally, persists the session across
//! restarts, injects the credential into outgoing requests, reacts to
//! authorization loss, and decides whether navigation into a protected
//! route is allowed.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vestibule::backend::{HttpAuthApi, LoginRequest};
//! use vestibule::guard::{can_enter, RouteAccess};
//! use vestibule::session::{FileCredentialStorage, SessionStore};
//!
//! let storage = FileCredentialStorage::new("/var/lib/portal/session")?;
//! let api = HttpAuthApi::new("https://api.example.com");
//! let store = Arc::new(SessionStore::new(storage, api));
//!
//! // Restore a previous session before any route is evaluated.
//! store.restore();
//!
//! // Later, on the login screen:
//! let identity = store
//!     .login(&LoginRequest::new("amalia", "hunter2"))
//!     .await?;
//!
//! // Navigation consults the guard with a synchronous snapshot.
//! let decision = can_enter(
//!     &RouteAccess::Role("ADMIN".into()),
//!     &store.snapshot(),
//!     Some("/admin/users"),
//! );
//! ```

pub mod backend;
pub mod config;
pub mod events;
pub mod guard;
pub mod http;
pub mod identity;
pub mod secret;
pub mod session;
pub mod token;

pub use backend::{AuthApi, LoginRequest, LoginResponse, MockAuthApi};
pub use config::SessionConfig;
pub use events::register_event_listeners;
pub use guard::{can_enter, Decision, RedirectTarget, RouteAccess};
pub use identity::Identity;
pub use secret::SecretString;
pub use session::{
    CredentialStorage, FileCredentialStorage, InMemoryCredentialStorage, Session,
    SessionSnapshot, SessionStore,
};

use std::fmt;

/// Errors produced by session, credential and backend operations.
///
/// Credential problems (`TokenInvalid`, `TokenExpired`) never escape the
/// session layer as user-facing failures; they collapse into "not
/// authenticated". Login failures are classified so callers can display
/// a meaningful message.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// The credential is structurally malformed and cannot be decoded.
    TokenInvalid,
    /// The credential decoded cleanly but its expiry has passed.
    TokenExpired,
    /// The backend rejected the login credentials (HTTP 401).
    InvalidCredentials,
    /// The backend could not be reached at all.
    ServerUnreachable(String),
    /// The backend answered the login with an unexpected status.
    BackendError(u16),
    /// The backend answered 2xx but the body was not a login response.
    UnexpectedResponse(String),
    /// Durable session storage failed to read or write.
    StorageError(String),
    /// Invalid configuration supplied at construction time.
    ConfigurationError(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::TokenInvalid => write!(f, "Invalid credential"),
            AuthError::TokenExpired => write!(f, "Credential has expired"),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::ServerUnreachable(msg) => write!(f, "Server unreachable: {msg}"),
            AuthError::BackendError(status) => write!(f, "Backend returned status {status}"),
            AuthError::UnexpectedResponse(msg) => write!(f, "Unexpected backend response: {msg}"),
            AuthError::StorageError(msg) => write!(f, "Session storage error: {msg}"),
            AuthError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}
