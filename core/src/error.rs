//! Error types for the REST client.
//!
//! # Design
//! `RestError` is a flat taxonomy: every failed operation yields exactly one
//! variant. Failures that happen before dispatch (`DataSerialization`,
//! `ForbiddenHeader`) are distinguishable from failures reported by the
//! transport (`Network`) and from failures interpreting the response
//! (`JsonSerialization`, `NoDataReturned`).
//!
//! `SerializationError` is the narrower error produced by `Serializable`
//! implementations. It is wrapped as the source of
//! `RestError::DataSerialization` so callers can still inspect it.

use thiserror::Error;

use crate::http::TransportError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RestError>;

/// Errors produced while turning a value into body bytes.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The value could not be represented as UTF-8 text.
    #[error("text is not valid UTF-8")]
    Text,

    /// The value could not be encoded as a JSON object.
    #[error("JSON encoding failed: {0}")]
    Json(String),

    /// Failure reported by a `Serializable` implementation outside this crate.
    #[error("serialization failed: {0}")]
    Other(String),
}

/// Errors returned by `RestClient` operations.
#[derive(Debug, Error)]
pub enum RestError {
    /// The request body could not be built. Nothing was sent.
    #[error("request body could not be serialized")]
    DataSerialization(#[source] SerializationError),

    /// The caller supplied a header the client does not allow. Nothing was sent.
    #[error("header `{0}` may not be set by the caller")]
    ForbiddenHeader(String),

    /// The response body was not a JSON object.
    #[error("response is not a JSON object: {0}")]
    JsonSerialization(String),

    /// The transport failed to complete the exchange.
    #[error("network error")]
    Network(#[source] TransportError),

    /// The exchange completed without an error but also without a body.
    #[error("no data returned")]
    NoDataReturned,
}

impl From<SerializationError> for RestError {
    fn from(err: SerializationError) -> Self {
        RestError::DataSerialization(err)
    }
}

impl From<TransportError> for RestError {
    fn from(err: TransportError) -> Self {
        RestError::Network(err)
    }
}
