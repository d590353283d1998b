//! Ops Manager public API contract types and validation
//!
//! This crate defines the request descriptors, query value types and the
//! local input validation shared by the REST client, the transport layer
//! and the mock transport. Response payloads are deliberately left as
//! untyped JSON documents ([`ApiDocument`]).

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
