//! Turning a transport outcome into a JSON result.
//!
//! # Design
//! The classifier inspects the outcome in a fixed order:
//!
//! 1. a transport error wins over everything else and becomes
//!    `RestError::Network`;
//! 2. otherwise a body must parse as a JSON object, or the result is
//!    `RestError::JsonSerialization`;
//! 3. otherwise, with neither error nor body, the result is
//!    `RestError::NoDataReturned`.
//!
//! The HTTP status does not take part; it is passed through in the metadata.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::RestError;
use crate::http::{ResponseMetadata, TransportOutcome};

/// A decoded JSON object.
pub type JsonObject = Map<String, Value>;

/// A successful response: the decoded object plus what the transport knew
/// about the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub body: JsonObject,
    pub metadata: Option<ResponseMetadata>,
}

impl JsonResponse {
    pub fn status(&self) -> Option<u16> {
        self.metadata.as_ref().map(|m| m.status)
    }
}

pub fn classify(outcome: TransportOutcome) -> Result<JsonResponse, RestError> {
    let TransportOutcome {
        body,
        metadata,
        error,
    } = outcome;

    if let Some(error) = error {
        debug!(error = %error, "transport reported an error");
        return Err(RestError::Network(error));
    }

    let Some(bytes) = body else {
        debug!("transport completed without a body");
        return Err(RestError::NoDataReturned);
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(body)) => Ok(JsonResponse { body, metadata }),
        Ok(other) => Err(RestError::JsonSerialization(format!(
            "expected an object, found {}",
            kind_of(&other)
        ))),
        Err(e) => Err(RestError::JsonSerialization(e.to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
