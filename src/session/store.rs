//! The session store: single owner of the current session.

use std::sync::RwLock;

use chrono::Utc;
use tokio::sync::watch;

use super::storage::{CredentialStorage, IDENTITY_KEY, TOKEN_KEY};
use super::{Session, SessionSnapshot};
use crate::backend::{AuthApi, LoginRequest};
use crate::config::SessionConfig;
use crate::events::{dispatch, SessionEvent};
use crate::identity::{Identity, StoredIdentity, ROLE_ADMIN, ROLE_STUDENT, ROLE_USER};
use crate::token;
use crate::AuthError;

/// Process-wide owner of the current session.
///
/// The store cycles between two states, `Anonymous` and
/// `Authenticated`, for the life of the application. It is the only
/// writer of the two durable storage slots and the only component that
/// mutates session state; everything else reads a synchronous snapshot
/// or subscribes to the identity stream.
///
/// Construct one store at application bootstrap, call
/// [`restore`](Self::restore) before the first route evaluation, and
/// share it behind an `Arc`.
pub struct SessionStore<S: CredentialStorage, A: AuthApi> {
    storage: S,
    api: A,
    config: SessionConfig,
    session: RwLock<Option<Session>>,
    identity_tx: watch::Sender<Option<Identity>>,
}

impl<S: CredentialStorage, A: AuthApi> SessionStore<S, A> {
    /// Creates a store with default configuration.
    pub fn new(storage: S, api: A) -> Self {
        Self::with_config(storage, api, SessionConfig::default())
    }

    /// Creates a store with custom configuration.
    pub fn with_config(storage: S, api: A, config: SessionConfig) -> Self {
        let (identity_tx, _) = watch::channel(None);

        Self {
            storage,
            api,
            config,
            session: RwLock::new(None),
            identity_tx,
        }
    }

    /// Restores a previous session from durable storage.
    ///
    /// Invoked once at startup, before any protected route is
    /// evaluated. Never fails: a storage error, a missing slot, an
    /// undecodable identity document or an expired credential all
    /// result in the `Anonymous` state with storage cleared. Lenient
    /// field defaulting of the stored identity happens here and only
    /// here.
    ///
    /// Returns true if a session was restored. Idempotent: with
    /// unchanged storage, a second call yields the same state.
    pub fn restore(&self) -> bool {
        let token = self.read_slot(TOKEN_KEY);
        let identity_doc = self.read_slot(IDENTITY_KEY);

        let session = match (token, identity_doc) {
            (Some(token), Some(doc)) if !token::is_expired(&token) => {
                match serde_json::from_str::<StoredIdentity>(&doc) {
                    Ok(stored) => Some(Session::new(token, stored.into())),
                    Err(e) => {
                        log::warn!(
                            target: "vestibule_session",
                            "msg=\"stored identity unreadable, discarding session\" error=\"{e}\""
                        );
                        None
                    }
                }
            }
            _ => None,
        };

        match session {
            Some(session) => {
                log::info!(
                    target: "vestibule_session",
                    "msg=\"session restored\" username=\"{}\"",
                    session.identity.username
                );
                self.replace(Some(session));
                true
            }
            None => {
                self.clear_storage();
                self.replace(None);
                false
            }
        }
    }

    /// Sends credentials to the backend and, on success, enters the
    /// `Authenticated` state.
    ///
    /// The credential and identity are persisted durably before the
    /// in-memory transition. Backend errors propagate unchanged (no
    /// retry) and leave the current state untouched; a storage-write
    /// failure also surfaces, with both slots cleared so storage never
    /// holds half a session.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "login", skip_all, err))]
    pub async fn login(&self, request: &LoginRequest) -> Result<Identity, AuthError> {
        let response = match self.api.login(request).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!(
                    target: "vestibule_session",
                    "msg=\"login failed\" username=\"{}\" error=\"{e}\"",
                    request.username
                );
                dispatch(SessionEvent::LoginFailed {
                    username: request.username.clone(),
                    reason: e.to_string(),
                    at: Utc::now(),
                })
                .await;
                return Err(e);
            }
        };

        if let Err(e) = self.persist(&response.token, &response.user) {
            self.clear_storage();
            return Err(e);
        }

        let identity = response.user;
        self.replace(Some(Session::new(response.token, identity.clone())));

        log::info!(
            target: "vestibule_session",
            "msg=\"login success\" username=\"{}\"",
            identity.username
        );
        dispatch(SessionEvent::LoginSucceeded {
            username: identity.username.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(identity)
    }

    /// Ends the session from any state.
    ///
    /// Clears both storage slots (best effort; failures are logged,
    /// never surfaced), drops the in-memory session and publishes an
    /// absent identity. Idempotent: logging out while `Anonymous` is a
    /// no-op. Navigation returns to the login view through the route
    /// guard's redirect on the next protected-route evaluation.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "logout", skip_all))]
    pub async fn logout(&self) {
        self.clear_storage();
        self.replace(None);

        log::info!(target: "vestibule_session", "msg=\"logout\"");
        dispatch(SessionEvent::LoggedOut { at: Utc::now() }).await;
    }

    /// Ends the session proactively when the credential is about to
    /// expire.
    ///
    /// Returns true if a session is present with more than the
    /// configured threshold of lifetime remaining. A session within the
    /// threshold (or with an undecodable credential) is logged out and
    /// false is returned; `Anonymous` returns false without side
    /// effects.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "ensure_fresh", skip_all))]
    pub async fn ensure_fresh(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };

        if token::is_near_expiry(&token, self.config.near_expiry_threshold) {
            log::info!(
                target: "vestibule_session",
                "msg=\"credential near expiry, ending session\""
            );
            dispatch(SessionEvent::SessionExpired { at: Utc::now() }).await;
            self.logout().await;
            return false;
        }

        true
    }

    /// Synchronous snapshot of the current identity.
    pub fn current_identity(&self) -> Option<Identity> {
        self.session
            .read()
            .map(|guard| guard.as_ref().map(|s| s.identity.clone()))
            .unwrap_or(None)
    }

    /// The raw credential, if a session is present.
    pub fn token(&self) -> Option<String> {
        self.session
            .read()
            .map(|guard| guard.as_ref().map(|s| s.token.clone()))
            .unwrap_or(None)
    }

    /// True when a credential is present and not expired right now.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|token| !token::is_expired(&token))
    }

    /// Case-sensitive role membership of the current session.
    ///
    /// False for every label while `Anonymous` or once the credential
    /// has expired.
    pub fn has_role(&self, role: &str) -> bool {
        self.is_authenticated()
            && self
                .current_identity()
                .is_some_and(|identity| identity.has_role(role))
    }

    /// True when any of the given labels is held.
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    /// True when the current session holds the `ADMIN` role.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// True when the current session holds a regular-user role.
    pub fn is_user(&self) -> bool {
        self.has_any_role(&[ROLE_USER, ROLE_STUDENT])
    }

    /// Point-in-time view for the route guard.
    pub fn snapshot(&self) -> SessionSnapshot {
        match self.session.read() {
            Ok(guard) => match guard.as_ref() {
                Some(session) if !token::is_expired(&session.token) => {
                    SessionSnapshot::authenticated(session.identity.clone())
                }
                _ => SessionSnapshot::anonymous(),
            },
            Err(_) => SessionSnapshot::anonymous(),
        }
    }

    /// Subscribes to the identity stream.
    ///
    /// The receiver observes the current value immediately and every
    /// transition thereafter (replay-latest semantics); after a
    /// completed transition no subscriber can read the previous value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity_tx.subscribe()
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn read_slot(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    target: "vestibule_session",
                    "msg=\"storage read failed\" key=\"{key}\" error=\"{e}\""
                );
                None
            }
        }
    }

    fn persist(&self, token: &str, identity: &Identity) -> Result<(), AuthError> {
        let identity_doc = serde_json::to_string(identity)
            .map_err(|e| AuthError::StorageError(format!("Failed to serialize identity: {e}")))?;

        self.storage.put(TOKEN_KEY, token)?;
        self.storage.put(IDENTITY_KEY, &identity_doc)?;
        Ok(())
    }

    fn clear_storage(&self) {
        for key in [TOKEN_KEY, IDENTITY_KEY] {
            if let Err(e) = self.storage.remove(key) {
                log::warn!(
                    target: "vestibule_session",
                    "msg=\"storage clear failed\" key=\"{key}\" error=\"{e}\""
                );
            }
        }
    }

    /// Swaps the in-memory session, then publishes the new identity.
    /// The snapshot must be updated first so a subscriber waking on the
    /// stream never reads a stale snapshot.
    fn replace(&self, next: Option<Session>) {
        let identity = next.as_ref().map(|s| s.identity.clone());

        match self.session.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }

        self.identity_tx.send_replace(identity);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::backend::{LoginResponse, MockAuthApi};
    use crate::identity::mock_identity;
    use crate::session::InMemoryCredentialStorage;
    use crate::token::mock_token;

    type TestStore = SessionStore<InMemoryCredentialStorage, MockAuthApi>;

    fn store_with(api: MockAuthApi) -> TestStore {
        SessionStore::new(InMemoryCredentialStorage::new(), api)
    }

    fn login_ok(username: &str, roles: &[&str], ttl: Duration) -> Result<LoginResponse, AuthError> {
        Ok(LoginResponse {
            user: mock_identity(username, roles),
            token: mock_token(Utc::now().timestamp() + ttl.num_seconds()),
        })
    }

    #[tokio::test]
    async fn test_login_success_persists_and_publishes() {
        let api = MockAuthApi::with_response(login_ok("amalia", &["ADMIN"], Duration::hours(1)));
        let store = store_with(api);
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_none());

        let identity = store
            .login(&LoginRequest::new("amalia", "hunter2"))
            .await
            .unwrap();

        assert_eq!(identity.username, "amalia");
        assert!(store.is_authenticated());
        assert!(store.is_admin());

        // both slots written
        assert!(store.storage.get(TOKEN_KEY).unwrap().is_some());
        assert!(store.storage.get(IDENTITY_KEY).unwrap().is_some());

        // subscriber observes the transition
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|i| i.username.clone()),
            Some("amalia".to_owned())
        );
    }

    #[tokio::test]
    async fn test_login_failure_leaves_state_untouched() {
        let api = MockAuthApi::with_response(Err(AuthError::InvalidCredentials));
        let store = store_with(api);

        let err = store
            .login(&LoginRequest::new("amalia", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(!store.is_authenticated());
        assert!(store.current_identity().is_none());
        assert!(store.storage.is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_everything_and_is_idempotent() {
        let api = MockAuthApi::with_response(login_ok("amalia", &["USER"], Duration::hours(1)));
        let store = store_with(api);
        store
            .login(&LoginRequest::new("amalia", "hunter2"))
            .await
            .unwrap();

        store.logout().await;

        assert!(!store.is_authenticated());
        assert!(store.current_identity().is_none());
        assert_eq!(store.storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.storage.get(IDENTITY_KEY).unwrap(), None);

        // logging out while Anonymous is a no-op
        store.logout().await;
        assert!(store.storage.is_empty());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_valid_session() {
        let store = store_with(MockAuthApi::new());
        let token = mock_token(Utc::now().timestamp() + 3_600);
        store.storage.put(TOKEN_KEY, &token).unwrap();
        store
            .storage
            .put(
                IDENTITY_KEY,
                &serde_json::to_string(&mock_identity("amalia", &["USER"])).unwrap(),
            )
            .unwrap();

        assert!(store.restore());
        assert!(store.is_authenticated());
        assert_eq!(store.token(), Some(token));
        assert!(store.has_role("USER"));
    }

    #[tokio::test]
    async fn test_restore_purges_expired_session() {
        let store = store_with(MockAuthApi::new());
        store
            .storage
            .put(TOKEN_KEY, &mock_token(Utc::now().timestamp() - 10))
            .unwrap();
        store
            .storage
            .put(
                IDENTITY_KEY,
                &serde_json::to_string(&mock_identity("amalia", &["USER"])).unwrap(),
            )
            .unwrap();

        assert!(!store.restore());
        assert!(!store.is_authenticated());
        assert!(store.storage.is_empty());
    }

    #[tokio::test]
    async fn test_restore_purges_unreadable_identity() {
        let store = store_with(MockAuthApi::new());
        store
            .storage
            .put(TOKEN_KEY, &mock_token(Utc::now().timestamp() + 3_600))
            .unwrap();
        store.storage.put(IDENTITY_KEY, "{not json").unwrap();

        assert!(!store.restore());
        assert!(store.storage.is_empty());
    }

    #[tokio::test]
    async fn test_restore_defaults_missing_identity_fields() {
        let store = store_with(MockAuthApi::new());
        store
            .storage
            .put(TOKEN_KEY, &mock_token(Utc::now().timestamp() + 3_600))
            .unwrap();
        store
            .storage
            .put(IDENTITY_KEY, r#"{"id":"7","email":"amalia@example.com"}"#)
            .unwrap();

        assert!(store.restore());
        let identity = store.current_identity().unwrap();
        assert_eq!(identity.username, "amalia@example.com");
        assert!(identity.active);
        assert!(identity.roles.is_empty());
    }

    #[tokio::test]
    async fn test_restore_empty_storage_stays_anonymous() {
        let store = store_with(MockAuthApi::new());

        assert!(!store.restore());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_is_idempotent() {
        let store = store_with(MockAuthApi::new());
        let token = mock_token(Utc::now().timestamp() + 3_600);
        store.storage.put(TOKEN_KEY, &token).unwrap();
        store
            .storage
            .put(
                IDENTITY_KEY,
                &serde_json::to_string(&mock_identity("amalia", &[])).unwrap(),
            )
            .unwrap();

        assert!(store.restore());
        assert!(store.restore());
        assert!(store.is_authenticated());
        assert_eq!(store.storage.len(), 2);
    }

    #[tokio::test]
    async fn test_role_queries_on_anonymous_session() {
        let store = store_with(MockAuthApi::new());

        assert!(!store.has_role("ADMIN"));
        assert!(!store.is_admin());
        assert!(!store.is_user());
        assert!(!store.has_any_role(&["ADMIN", "USER", ""]));
    }

    #[tokio::test]
    async fn test_role_queries_are_case_sensitive() {
        let api = MockAuthApi::with_response(login_ok("amalia", &["admin"], Duration::hours(1)));
        let store = store_with(api);
        store
            .login(&LoginRequest::new("amalia", "hunter2"))
            .await
            .unwrap();

        assert!(store.has_role("admin"));
        assert!(!store.has_role("ADMIN"));
        assert!(!store.is_admin());
    }

    #[tokio::test]
    async fn test_expired_credential_fails_closed() {
        let api = MockAuthApi::with_response(login_ok("amalia", &["ADMIN"], Duration::seconds(-10)));
        let store = store_with(api);
        store
            .login(&LoginRequest::new("amalia", "hunter2"))
            .await
            .unwrap();

        // the session is held in memory but the credential is already past expiry
        assert!(!store.is_authenticated());
        assert!(!store.has_role("ADMIN"));
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_ensure_fresh_keeps_healthy_session() {
        let api = MockAuthApi::with_response(login_ok("amalia", &["USER"], Duration::hours(1)));
        let store = store_with(api);
        store
            .login(&LoginRequest::new("amalia", "hunter2"))
            .await
            .unwrap();

        assert!(store.ensure_fresh().await);
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_ensure_fresh_ends_near_expiry_session() {
        let api = MockAuthApi::with_response(login_ok("amalia", &["USER"], Duration::seconds(120)));
        let store = store_with(api);
        store
            .login(&LoginRequest::new("amalia", "hunter2"))
            .await
            .unwrap();

        // 120s remaining < 300s threshold
        assert!(!store.ensure_fresh().await);
        assert!(!store.is_authenticated());
        assert!(store.storage.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_fresh_anonymous_is_a_no_op() {
        let store = store_with(MockAuthApi::new());
        assert!(!store.ensure_fresh().await);
    }

    #[tokio::test]
    async fn test_subscriber_never_sees_stale_value_after_logout() {
        let api = MockAuthApi::with_response(login_ok("amalia", &["USER"], Duration::hours(1)));
        let store = store_with(api);
        store
            .login(&LoginRequest::new("amalia", "hunter2"))
            .await
            .unwrap();

        store.logout().await;

        // a subscriber arriving after the transition replays the latest value
        let rx = store.subscribe();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_custom_near_expiry_threshold() {
        let api = MockAuthApi::with_response(login_ok("amalia", &["USER"], Duration::seconds(120)));
        let store = SessionStore::with_config(
            InMemoryCredentialStorage::new(),
            api,
            SessionConfig::new().with_near_expiry_threshold(Duration::seconds(60)),
        );
        store
            .login(&LoginRequest::new("amalia", "hunter2"))
            .await
            .unwrap();

        // 120s remaining is comfortably above the 60s threshold
        assert!(store.ensure_fresh().await);
    }
}
