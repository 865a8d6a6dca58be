//! Concrete transport over `reqwest`.

use async_trait::async_trait;

use super::{BackendResponse, HttpSend, Method, OutgoingRequest};
use crate::AuthError;

/// Sends [`OutgoingRequest`]s with a `reqwest::Client`.
///
/// Relies on the client's default timeouts. Error statuses are returned
/// as responses; only a failure to produce any response at all becomes
/// an `Err`.
#[derive(Clone, Default)]
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses an existing client (connection pool, proxy settings).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn send(&self, request: OutgoingRequest) -> Result<BackendResponse, AuthError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
            Method::Patch => self.client.patch(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AuthError::ServerUnreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?;

        Ok(BackendResponse { status, body })
    }
}
