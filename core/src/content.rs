//! Request body content and its MIME type.
//!
//! # Design
//! `Serializable` is the seam between caller payloads and the wire. Any type
//! that can produce bytes and name its content type can be sent as a POST
//! body or as one part of a multipart form, so new content kinds are added by
//! implementing the trait, never by teaching the client about them.
//!
//! `as_bytes` must be pure: calling it twice yields the same bytes, and it
//! never has side effects. `content_type` must not change over the value's
//! lifetime.

use std::ffi::{OsStr, OsString};
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use crate::error::SerializationError;
use crate::finite;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A value that can serialize itself as MIME content.
pub trait Serializable: Send + Sync {
    fn as_bytes(&self) -> Result<Bytes, SerializationError>;

    fn content_type(&self) -> &str;
}

impl Serializable for str {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }

    fn content_type(&self) -> &str {
        TEXT_PLAIN
    }
}

impl Serializable for String {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        Serializable::as_bytes(self.as_str())
    }

    fn content_type(&self) -> &str {
        TEXT_PLAIN
    }
}

/// Platform strings are sent as text only when they hold valid Unicode.
impl Serializable for OsStr {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        self.to_str()
            .map(|s| Bytes::copy_from_slice(s.as_bytes()))
            .ok_or(SerializationError::Text)
    }

    fn content_type(&self) -> &str {
        TEXT_PLAIN
    }
}

impl Serializable for OsString {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        Serializable::as_bytes(self.as_os_str())
    }

    fn content_type(&self) -> &str {
        TEXT_PLAIN
    }
}

impl Serializable for [u8] {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        Ok(Bytes::copy_from_slice(self))
    }

    fn content_type(&self) -> &str {
        OCTET_STREAM
    }
}

impl Serializable for Vec<u8> {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        Ok(Bytes::copy_from_slice(self))
    }

    fn content_type(&self) -> &str {
        OCTET_STREAM
    }
}

impl Serializable for Bytes {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        Ok(self.clone())
    }

    fn content_type(&self) -> &str {
        OCTET_STREAM
    }
}

impl<T: Serializable + ?Sized> Serializable for &T {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        (**self).as_bytes()
    }

    fn content_type(&self) -> &str {
        (**self).content_type()
    }
}

impl<T: Serializable + ?Sized> Serializable for Box<T> {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        (**self).as_bytes()
    }

    fn content_type(&self) -> &str {
        (**self).content_type()
    }
}

impl<T: Serializable + ?Sized> Serializable for Arc<T> {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        (**self).as_bytes()
    }

    fn content_type(&self) -> &str {
        (**self).content_type()
    }
}

/// A string-keyed mapping sent as `application/json`.
///
/// Wraps anything `Serialize` (a `HashMap<String, _>`, a `serde_json::Map`, a
/// struct). Encoding fails as a whole if the value does not serialize to a
/// JSON object, if any map key is not a string, or if it contains a number
/// JSON cannot represent.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize + Send + Sync> Serializable for Json<T> {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        finite::check(&self.0).map_err(|e| SerializationError::Json(e.to_string()))?;
        let value =
            serde_json::to_value(&self.0).map_err(|e| SerializationError::Json(e.to_string()))?;
        if !value.is_object() {
            return Err(SerializationError::Json(
                "top-level value is not an object".to_string(),
            ));
        }
        serde_json::to_vec(&value)
            .map(Bytes::from)
            .map_err(|e| SerializationError::Json(e.to_string()))
    }

    fn content_type(&self) -> &str {
        APPLICATION_JSON
    }
}

/// Raw bytes presented under a caller-chosen content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedBytes {
    data: Bytes,
    content_type: String,
}

impl TypedBytes {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }
}

impl Serializable for TypedBytes {
    fn as_bytes(&self) -> Result<Bytes, SerializationError> {
        Ok(self.data.clone())
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }
}
