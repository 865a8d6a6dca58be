//! The backend authentication endpoint, consumed as a collaborator.
//!
//! The only backend call the session layer makes itself is the login
//! request; everything else in the application goes through the
//! request pipeline in [`http`](crate::http). [`AuthApi`] keeps the
//! store testable; [`HttpAuthApi`] is the real client.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "reqwest")]
use crate::config::DEFAULT_LOGIN_PATH;
use crate::identity::Identity;
use crate::secret::SecretString;
use crate::AuthError;

/// Credentials submitted to the login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

impl LoginRequest {
    /// Creates a login request.
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful login response: the identity paired with its credential.
///
/// Extra response fields (such as a human-readable `message`) are
/// ignored.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub user: Identity,
    pub token: String,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Backend authentication API.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for an identity and a bearer credential.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredentials` - the backend rejected the
    ///   credentials (HTTP 401)
    /// - `AuthError::ServerUnreachable` - the backend could not be
    ///   contacted
    /// - `AuthError::BackendError` - any other non-success status
    /// - `AuthError::UnexpectedResponse` - a success status with an
    ///   undecodable body
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError>;
}

/// HTTP client for the backend authentication endpoint.
///
/// Posts JSON to `{base_url}/auth/login`. Relies on the transport's
/// default timeouts; an in-flight login cannot be cancelled.
#[cfg(feature = "reqwest")]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "reqwest")]
impl HttpAuthApi {
    /// Creates a client for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self { client, base_url }
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl AuthApi for HttpAuthApi {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "backend_login", skip_all, err)
    )]
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let url = format!("{}{DEFAULT_LOGIN_PATH}", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AuthError::ServerUnreachable(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 {
            return Err(AuthError::InvalidCredentials);
        }
        if !(200..300).contains(&status) {
            return Err(AuthError::BackendError(status));
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))
    }
}

/// Scriptable [`AuthApi`] for tests.
///
/// Queue outcomes with [`push_response`](MockAuthApi::push_response);
/// each `login` call consumes one. Submitted requests are recorded for
/// assertions. An empty queue answers `ServerUnreachable`.
#[derive(Clone, Default)]
pub struct MockAuthApi {
    pub responses: Arc<Mutex<VecDeque<Result<LoginResponse, AuthError>>>>,
    pub requests: Arc<Mutex<Vec<LoginRequest>>>,
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that answers every login with the given outcome
    /// once.
    pub fn with_response(response: Result<LoginResponse, AuthError>) -> Self {
        let mock = Self::new();
        mock.push_response(response);
        mock
    }

    /// Queues an outcome for the next login call.
    pub fn push_response(&self, response: Result<LoginResponse, AuthError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Number of login calls received.
    pub fn login_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        self.requests.lock().unwrap().push(request.clone());

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::ServerUnreachable("no response queued".to_owned())))
    }
}
