//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! and hands it to an `HttpTransport`, which performs the I/O and reports a
//! `TransportOutcome`. Connection pooling, TLS, redirects and timeouts all
//! live behind the trait; nothing in this crate touches a socket directly.
//!
//! `TransportOutcome` keeps the three-field shape a transport naturally
//! produces (body, metadata, error) instead of a `Result`, because the
//! classifier in `response` defines how the combinations are interpreted.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built HTTP request described as plain data.
///
/// Produced by `RestClient::build_*`. Never mutated after it is handed to the
/// transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// First value of the header named `name`, compared ASCII case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status line and headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseMetadata {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Failure reported by a transport. The underlying cause, when there is one,
/// is kept as the error source.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, using its `Display` output as the message.
    pub fn from_source<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What a transport observed for one dispatched request.
///
/// Transports report exactly one of: an error, a body, or neither. Metadata
/// may accompany any of them.
#[derive(Debug)]
pub struct TransportOutcome {
    pub body: Option<Bytes>,
    pub metadata: Option<ResponseMetadata>,
    pub error: Option<TransportError>,
}

impl TransportOutcome {
    /// The exchange finished and produced a body.
    pub fn completed(body: impl Into<Bytes>, metadata: Option<ResponseMetadata>) -> Self {
        Self {
            body: Some(body.into()),
            metadata,
            error: None,
        }
    }

    /// The exchange finished without a body.
    pub fn empty(metadata: Option<ResponseMetadata>) -> Self {
        Self {
            body: None,
            metadata,
            error: None,
        }
    }

    /// The exchange failed at the transport level.
    pub fn failed(error: TransportError, metadata: Option<ResponseMetadata>) -> Self {
        Self {
            body: None,
            metadata,
            error: Some(error),
        }
    }
}

/// Performs the network round-trip for a built request.
///
/// Implementations must resolve every dispatched request exactly once. Any
/// retry, timeout or cancellation policy belongs to the implementation.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn dispatch(&self, request: HttpRequest) -> TransportOutcome;
}
