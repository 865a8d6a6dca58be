use chrono::{DateTime, Utc};

/// Session transitions emitted by the store and the request pipeline.
///
/// Events are always fired; without registered listeners they are a
/// no-op. Register listeners via
/// [`register_event_listeners`](crate::register_event_listeners).
#[derive(Debug, Clone)]
pub enum SessionEvent {
    // authentication
    LoginSucceeded {
        username: String,
        at: DateTime<Utc>,
    },
    LoginFailed {
        username: String,
        reason: String,
        at: DateTime<Utc>,
    },
    LoggedOut {
        at: DateTime<Utc>,
    },

    // credential lifetime
    SessionExpired {
        at: DateTime<Utc>,
    },
    AuthorizationLost {
        url: String,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginSucceeded { .. } => "session.login.success",
            Self::LoginFailed { .. } => "session.login.failed",
            Self::LoggedOut { .. } => "session.logout",
            Self::SessionExpired { .. } => "session.expired",
            Self::AuthorizationLost { .. } => "session.authorization_lost",
        }
    }

    /// Returns the timestamp when this event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::LoginSucceeded { at, .. }
            | Self::LoginFailed { at, .. }
            | Self::LoggedOut { at, .. }
            | Self::SessionExpired { at, .. }
            | Self::AuthorizationLost { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let now = Utc::now();

        assert_eq!(
            SessionEvent::LoginSucceeded {
                username: "amalia".to_owned(),
                at: now
            }
            .name(),
            "session.login.success"
        );

        assert_eq!(
            SessionEvent::LoginFailed {
                username: "amalia".to_owned(),
                reason: "invalid credentials".to_owned(),
                at: now
            }
            .name(),
            "session.login.failed"
        );

        assert_eq!(SessionEvent::LoggedOut { at: now }.name(), "session.logout");
        assert_eq!(
            SessionEvent::SessionExpired { at: now }.name(),
            "session.expired"
        );
        assert_eq!(
            SessionEvent::AuthorizationLost {
                url: "/api/notas".to_owned(),
                at: now
            }
            .name(),
            "session.authorization_lost"
        );
    }

    #[test]
    fn test_event_timestamp() {
        let now = Utc::now();
        let event = SessionEvent::LoggedOut { at: now };

        assert_eq!(event.timestamp(), now);
    }

    #[test]
    fn test_event_debug_carries_context() {
        let event = SessionEvent::AuthorizationLost {
            url: "/api/notas".to_owned(),
            at: Utc::now(),
        };

        let debug = format!("{event:?}");
        assert!(debug.contains("AuthorizationLost"));
        assert!(debug.contains("/api/notas"));
    }
}
