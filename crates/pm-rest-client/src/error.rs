//! Error types for the REST API client

use pm_client_api::TransportError;
use thiserror::Error;

/// Errors that can occur when using the REST API client
///
/// Error documents returned by the service are not represented here; they
/// come back as ordinary [`ApiDocument`](pm_rest_api_contract::ApiDocument)
/// values.
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error(transparent)]
    InvalidArgument(#[from] pm_rest_api_contract::ApiContractError),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unexpected response document: {0}")]
    UnexpectedDocument(String),
}

impl RestClientError {
    /// Whether the error was raised by local validation, before any I/O.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Parameter named by a validation failure.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument(err) => err.parameter(),
            _ => None,
        }
    }
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;
