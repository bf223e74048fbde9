//! `multipart/form-data` body encoding.
//!
//! # Design
//! Each `FormPart` becomes one section:
//!
//! ```text
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="<field>"; filename="<file>"\r\n
//! Content-Type: <content type>\r\n
//! \r\n
//! <bytes>\r\n
//! ```
//!
//! followed, after the last part, by `--<boundary>--\r\n`. Sections appear in
//! the order the parts were given. Every part is serialized before anything
//! is written, so a failing part yields an error and never a partial body.

use std::fmt;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::content::Serializable;
use crate::error::SerializationError;

/// Boundary token used when a client is configured with a fixed boundary.
pub const DEFAULT_BOUNDARY: &str = "rest-core-form-boundary-7MA4YWxkTrZu0gW";

const CRLF: &[u8] = b"\r\n";

/// One named section of a multipart form.
#[derive(Clone)]
pub struct FormPart {
    content: Arc<dyn Serializable>,
    field_name: String,
    file_name: String,
}

impl FormPart {
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Serializable + 'static,
    ) -> Self {
        Self {
            content: Arc::new(content),
            field_name: field_name.into(),
            file_name: file_name.into(),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &dyn Serializable {
        self.content.as_ref()
    }
}

impl fmt::Debug for FormPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormPart")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content.content_type())
            .finish()
    }
}

/// The `Content-Type` header value announcing `boundary`.
pub fn content_type_for(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}

/// Encode `parts` into a single body delimited by `boundary`.
pub fn encode(parts: &[FormPart], boundary: &str) -> Result<Bytes, SerializationError> {
    let encoded = parts
        .iter()
        .map(|part| part.content.as_bytes())
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = BytesMut::new();
    for (part, bytes) in parts.iter().zip(encoded) {
        body.put_slice(b"--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(CRLF);
        body.put_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                escape_quoted(&part.field_name),
                escape_quoted(&part.file_name)
            )
            .as_bytes(),
        );
        body.put_slice(CRLF);
        body.put_slice(format!("Content-Type: {}", part.content.content_type()).as_bytes());
        body.put_slice(CRLF);
        body.put_slice(CRLF);
        body.put_slice(&bytes);
        body.put_slice(CRLF);
    }
    body.put_slice(b"--");
    body.put_slice(boundary.as_bytes());
    body.put_slice(b"--");
    body.put_slice(CRLF);
    Ok(body.freeze())
}

// Quoted-string values in Content-Disposition: `"`, CR and LF are
// percent-encoded the way browsers encode form field names.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
