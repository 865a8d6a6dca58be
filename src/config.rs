//! Configuration for the session layer.

use chrono::Duration;

/// Default near-expiry threshold: sessions within five minutes of
/// credential expiry are ended proactively instead of letting the next
/// request fail.
pub const DEFAULT_NEAR_EXPIRY_SECONDS: i64 = 300;

/// Path of the login endpoint, which must stay unauthenticated.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Tunables for [`SessionStore`](crate::session::SessionStore) and the
/// request authorizer.
///
/// # Example
///
/// ```rust
/// use chrono::Duration;
/// use vestibule::SessionConfig;
///
/// // Defaults
/// let config = SessionConfig::default();
///
/// // Or customize
/// let config = SessionConfig::new()
///     .with_near_expiry_threshold(Duration::minutes(10));
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remaining credential lifetime below which the session is ended
    /// proactively. Default: 300 seconds.
    pub near_expiry_threshold: Duration,

    /// Substring identifying the login endpoint; requests whose URL
    /// contains it are never given an `Authorization` header.
    /// Default: `/auth/login`.
    pub login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            near_expiry_threshold: Duration::seconds(DEFAULT_NEAR_EXPIRY_SECONDS),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the near-expiry threshold.
    #[must_use]
    pub fn with_near_expiry_threshold(mut self, threshold: Duration) -> Self {
        self.near_expiry_threshold = threshold;
        self
    }

    /// Sets the login endpoint path.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();

        assert_eq!(config.near_expiry_threshold, Duration::seconds(300));
        assert_eq!(config.login_path, "/auth/login");
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::new()
            .with_near_expiry_threshold(Duration::minutes(10))
            .with_login_path("/api/session");

        assert_eq!(config.near_expiry_threshold, Duration::minutes(10));
        assert_eq!(config.login_path, "/api/session");
    }
}
