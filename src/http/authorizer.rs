//! Credential injection and the 401 reaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::{BackendResponse, HttpSend, OutgoingRequest, AUTHORIZATION_HEADER};
use crate::backend::AuthApi;
use crate::events::{dispatch, SessionEvent};
use crate::session::{CredentialStorage, SessionStore};
use crate::AuthError;

/// Decorates a sender with the cross-cutting session concerns.
///
/// Every request passing through gains an `Authorization: Bearer`
/// header when a credential is present, except requests to the login
/// endpoint, which must stay unauthenticated. A response with status
/// 401 ends the session as a side effect and is then handed to the
/// caller unchanged; the authorizer never swallows, rewrites or
/// retries. Other failure statuses and transport errors pass through
/// untouched.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use vestibule::http::{AuthorizedSender, HttpSend, OutgoingRequest, ReqwestSender};
///
/// let sender = AuthorizedSender::new(ReqwestSender::new(), Arc::clone(&store));
/// let response = sender
///     .send(OutgoingRequest::get("https://api.example.com/api/students"))
///     .await?;
/// ```
pub struct AuthorizedSender<H, S, A>
where
    H: HttpSend,
    S: CredentialStorage,
    A: AuthApi,
{
    inner: H,
    store: Arc<SessionStore<S, A>>,
    login_path: String,
}

impl<H, S, A> AuthorizedSender<H, S, A>
where
    H: HttpSend,
    S: CredentialStorage,
    A: AuthApi,
{
    /// Wraps a sender. The login path comes from the store's
    /// configuration.
    pub fn new(inner: H, store: Arc<SessionStore<S, A>>) -> Self {
        let login_path = store.config().login_path.clone();

        Self {
            inner,
            store,
            login_path,
        }
    }

    /// The wrapped sender.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<H, S, A> HttpSend for AuthorizedSender<H, S, A>
where
    H: HttpSend,
    S: CredentialStorage,
    A: AuthApi,
{
    async fn send(&self, mut request: OutgoingRequest) -> Result<BackendResponse, AuthError> {
        let is_login = request.url.contains(&self.login_path);

        if !is_login {
            if let Some(token) = self.store.token() {
                // never clobber a header the caller set explicitly
                if request.header(AUTHORIZATION_HEADER).is_none() {
                    request
                        .headers
                        .push((AUTHORIZATION_HEADER.to_owned(), format!("Bearer {token}")));
                }
            }
        }

        let url = request.url.clone();
        let result = self.inner.send(request).await;

        if let Ok(response) = &result {
            if response.status == 401 {
                log::info!(
                    target: "vestibule_http",
                    "msg=\"authorization lost, ending session\" url=\"{url}\""
                );
                dispatch(SessionEvent::AuthorizationLost {
                    url,
                    at: Utc::now(),
                })
                .await;
                self.store.logout().await;
            }
        }

        result
    }
}
