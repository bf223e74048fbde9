//! Which caller-supplied headers a request may carry.
//!
//! # Design
//! A handful of headers are owned by the transport or by authentication
//! layers that this client does not provide, so callers may never set them.
//! `Content-Length` is additionally reserved whenever a body is present,
//! because the transport derives it from the body it actually sends.
//!
//! Names are matched exactly (case-sensitive).

use tracing::warn;

use crate::error::RestError;

/// Headers a caller may never set.
pub const FORBIDDEN_HEADERS: [&str; 4] = ["Authorization", "Connection", "Host", "WWW-Authenticate"];

/// Reserved when the request has a body.
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Result of checking a single header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderVerdict {
    Allowed,
    Rejected(String),
}

/// The forbidden-header rules applied by `RestClient`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPolicy;

impl HeaderPolicy {
    pub fn validate(&self, key: &str, has_body: bool) -> HeaderVerdict {
        if FORBIDDEN_HEADERS.contains(&key) || (has_body && key == CONTENT_LENGTH) {
            HeaderVerdict::Rejected(key.to_string())
        } else {
            HeaderVerdict::Allowed
        }
    }

    /// Validate `headers` in order and return them unchanged if all pass.
    ///
    /// Stops at the first rejected header; nothing is returned for the
    /// headers that passed before it.
    pub fn apply<I, K, V>(&self, headers: I, has_body: bool) -> Result<Vec<(String, String)>, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut applied = Vec::new();
        for (key, value) in headers {
            let key = key.into();
            if let HeaderVerdict::Rejected(key) = self.validate(&key, has_body) {
                warn!(header = %key, has_body, "rejecting caller header");
                return Err(RestError::ForbiddenHeader(key));
            }
            applied.push((key, value.into()));
        }
        Ok(applied)
    }
}
