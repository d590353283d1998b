//! Transport seam for the Ops Manager client
//!
//! The REST client turns every operation into a [`PreparedRequest`] and hands
//! it to a [`Transport`] together with the caller's [`Credentials`]. The
//! transport owns the HTTP exchange, including the digest handshake, and
//! returns the decoded JSON body.

use std::fmt;

use pm_rest_api_contract::validation::require_text;
use pm_rest_api_contract::{ApiContractResult, ApiDocument, PreparedRequest};
use thiserror::Error;

pub const USERNAME_ENV: &str = "PINGME_USERNAME";
pub const API_KEY_ENV: &str = "PINGME_API_KEY";

/// Failures raised while a request is on the wire.
///
/// These are always propagated as-is; nothing above the transport retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("server rejected the credentials (HTTP {status})")]
    AuthenticationRejected { status: u16 },

    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Principal and API key used for HTTP digest authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    principal: String,
    api_key: String,
}

impl Credentials {
    pub fn new(principal: impl Into<String>, api_key: impl Into<String>) -> ApiContractResult<Self> {
        let principal = principal.into();
        let api_key = api_key.into();
        require_text(&principal, "username")?;
        require_text(&api_key, "api_key")?;
        Ok(Self { principal, api_key })
    }

    /// Read `PINGME_USERNAME` and `PINGME_API_KEY`.
    pub fn from_env() -> ApiContractResult<Self> {
        let principal = std::env::var(USERNAME_ENV).unwrap_or_default();
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        require_text(&principal, USERNAME_ENV)?;
        require_text(&api_key, API_KEY_ENV)?;
        Ok(Self { principal, api_key })
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("principal", &self.principal)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Sends one prepared request and returns the decoded response document.
///
/// Any well-formed JSON body is returned, whatever the HTTP status; error
/// documents are left for the caller to inspect.
pub trait Transport: Send + Sync {
    fn send(&self, request: &PreparedRequest, credentials: &Credentials) -> TransportResult<ApiDocument>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &PreparedRequest, credentials: &Credentials) -> TransportResult<ApiDocument> {
        (**self).send(request, credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_reject_blank_values() {
        let err = Credentials::new("  ", "key").unwrap_err();
        assert_eq!(err.parameter(), Some("username"));
        let err = Credentials::new("ops@example.com", "").unwrap_err();
        assert_eq!(err.parameter(), Some("api_key"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let credentials = Credentials::new("ops@example.com", "s3cr3t-key").unwrap();
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("ops@example.com"));
        assert!(!rendered.contains("s3cr3t-key"));
    }

    #[test]
    fn test_decode_error_from_serde() {
        let err: TransportError = serde_json::from_str::<ApiDocument>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
