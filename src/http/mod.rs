//! The backend request pipeline.
//!
//! Application code describes a call with [`OutgoingRequest`] and hands
//! it to something implementing [`HttpSend`]. The pipeline is composed
//! by wrapping: [`AuthorizedSender`] decorates any sender with
//! credential injection and the 401 reaction, independent of the
//! transport underneath.

mod authorizer;
#[cfg(feature = "reqwest")]
mod reqwest_sender;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use authorizer::AuthorizedSender;
#[cfg(feature = "reqwest")]
pub use reqwest_sender::ReqwestSender;

use crate::AuthError;

/// Name of the credential header attached by the authorizer.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// HTTP methods used against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

/// A backend request, described independently of the transport.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl OutgoingRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(Method::Post, url);
        request.body = Some(body);
        request
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Looks up a header value, case-insensitively by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A backend response as seen by the pipeline: status and raw body.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: String,
}

impl BackendResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnexpectedResponse` if the body does not
    /// parse as the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AuthError> {
        serde_json::from_str(&self.body).map_err(|e| AuthError::UnexpectedResponse(e.to_string()))
    }
}

/// The "send request" capability the pipeline is built from.
///
/// An `Err` means the request never produced a response (the transport
/// failed); backend error statuses arrive as `Ok` responses with their
/// status intact.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<BackendResponse, AuthError>;
}

/// Scriptable [`HttpSend`] for tests.
///
/// Queue outcomes with [`push_response`](MockHttpSend::push_response);
/// each send consumes one and records the request it received. An empty
/// queue answers `200 OK` with an empty body.
#[derive(Clone, Default)]
pub struct MockHttpSend {
    pub responses: Arc<Mutex<VecDeque<Result<BackendResponse, AuthError>>>>,
    pub requests: Arc<Mutex<Vec<OutgoingRequest>>>,
}

impl MockHttpSend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an outcome for the next send.
    pub fn push_response(&self, response: Result<BackendResponse, AuthError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// The last request that passed through, if any.
    pub fn last_request(&self) -> Option<OutgoingRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn send(&self, request: OutgoingRequest) -> Result<BackendResponse, AuthError> {
        self.requests.lock().unwrap().push(request);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(BackendResponse::new(200, "")))
    }
}
