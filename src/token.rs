//! Credential decoding and expiry checks.
//!
//! The backend issues a signed bearer credential at login. The client
//! never holds the signing secret, so nothing here verifies signatures;
//! the middle payload segment is decoded structurally to read the
//! expiry and subject claims. Every check fails closed: a credential
//! that cannot be decoded is treated exactly like an expired one.
//!
//! All functions are pure over the token string and wall-clock time.
//! The `*_at` variants take an explicit evaluation time in seconds
//! since epoch; the plain variants use the current time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::AuthError;

/// Claims carried in the credential payload.
///
/// Only `exp` and `sub` are required for a credential to be considered
/// decodable; the remaining claims are passed through for callers that
/// want them. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenPayload {
    /// Issuer (optional).
    #[serde(default)]
    pub iss: Option<String>,
    /// Subject, typically the login handle.
    pub sub: String,
    /// Granted authorities as a comma/space-delimited list (optional).
    #[serde(default)]
    pub authorities: Option<String>,
    /// Issued-at time in Unix seconds (optional).
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiration time in Unix seconds.
    pub exp: i64,
    /// Unique token id (optional).
    #[serde(default)]
    pub jti: Option<String>,
    /// Not-before time in Unix seconds (optional).
    #[serde(default)]
    pub nbf: Option<i64>,
}

impl TokenPayload {
    /// Splits the `authorities` claim into individual labels.
    ///
    /// The backend delimits authorities with commas and/or spaces;
    /// empty entries are dropped. Returns an empty vector when the
    /// claim is absent.
    pub fn authority_labels(&self) -> Vec<&str> {
        self.authorities
            .as_deref()
            .map(|raw| {
                raw.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|label| !label.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Seconds remaining until expiry at the given evaluation time.
    ///
    /// Negative once the credential has expired.
    pub fn remaining_at(&self, now_secs: i64) -> i64 {
        self.exp - now_secs
    }
}

/// Decodes the payload segment of a credential.
///
/// The credential must consist of exactly three dot-separated segments.
/// The middle segment is base64 (URL-safe alphabet, no padding) of a
/// JSON document carrying at least `exp` and `sub`.
///
/// # Errors
///
/// Returns `AuthError::TokenInvalid` for any structural problem: wrong
/// segment count, invalid base64, invalid UTF-8 or invalid JSON.
/// Callers must treat decode failure identically to expiry.
pub fn decode(token: &str) -> Result<TokenPayload, AuthError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::TokenInvalid);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::TokenInvalid)?;

    serde_json::from_slice(&bytes).map_err(|_| AuthError::TokenInvalid)
}

/// Returns true if the credential is expired at the given time.
///
/// Fail-closed: an undecodable credential is expired. The boundary is
/// inclusive; a credential whose `exp` equals the evaluation time is
/// already expired. No clock-skew allowance is applied.
pub fn is_expired_at(token: &str, now_secs: i64) -> bool {
    match decode(token) {
        Ok(payload) => payload.exp <= now_secs,
        Err(_) => true,
    }
}

/// Returns true if the credential is expired now.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now().timestamp())
}

/// Returns true if less than `threshold` remains before expiry at the
/// given time.
///
/// Used to proactively end a session before a request fails mid-flight.
/// Fail-closed on decode failure.
pub fn is_near_expiry_at(token: &str, threshold: Duration, now_secs: i64) -> bool {
    match decode(token) {
        Ok(payload) => payload.remaining_at(now_secs) < threshold.num_seconds(),
        Err(_) => true,
    }
}

/// Returns true if less than `threshold` remains before expiry now.
pub fn is_near_expiry(token: &str, threshold: Duration) -> bool {
    is_near_expiry_at(token, threshold, Utc::now().timestamp())
}

/// Builds a structurally valid credential with the given expiry for
/// tests. The signature segment is a placeholder; nothing client-side
/// verifies it.
#[cfg(test)]
pub(crate) fn mock_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"amalia","exp":{exp}}}"#).as_bytes());
    format!("{header}.{payload}.sig")
}
