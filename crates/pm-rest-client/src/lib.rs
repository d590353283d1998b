//! REST API client for the MongoDB Ops Manager / Cloud Manager public API
//!
//! [`OpsManagerClient`] exposes one method per API operation. Input is
//! validated locally before anything is sent, requests are authenticated with
//! HTTP Digest by [`ReqwestTransport`], and responses come back as decoded
//! JSON documents.

pub mod auth;
pub mod client;
pub mod config;
pub mod deprecation;
pub mod error;
pub mod transport;

pub use client::*;
pub use config::*;
pub use error::*;
pub use transport::ReqwestTransport;

pub use pm_client_api::{Credentials, Transport, TransportError};
pub use pm_rest_api_contract as contract;
