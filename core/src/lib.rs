//! Minimal asynchronous REST client core.
//!
//! # Overview
//! Issues GET, POST, multipart POST and DELETE requests through a pluggable
//! `HttpTransport` and interprets every response as a JSON object.
//!
//! # Design
//! - Bodies come from `Serializable` values, so new content kinds plug in
//!   without touching the client.
//! - `RestClient::build_*` is pure: body encoding and header validation
//!   happen before anything reaches the transport.
//! - `response::classify` maps what the transport reports to a
//!   `JsonResponse` or exactly one `RestError`.
//! - The client holds only a transport handle and read-only configuration,
//!   and is cheap to clone.

pub mod client;
pub mod config;
pub mod content;
pub mod error;
mod finite;
pub mod handlers;
pub mod headers;
pub mod http;
pub mod multipart;
#[cfg(feature = "reqwest")]
pub mod reqwest_transport;
pub mod response;

pub use client::{RequestBody, RestClient};
pub use config::{BoundaryStrategy, RestClientConfig};
pub use content::{Json, Serializable, TypedBytes};
pub use error::{RestError, Result, SerializationError};
pub use handlers::dispatch_with_handlers;
pub use headers::{HeaderPolicy, HeaderVerdict};
pub use http::{HttpMethod, HttpRequest, HttpTransport, ResponseMetadata, TransportError, TransportOutcome};
pub use multipart::FormPart;
#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
pub use response::{classify, JsonObject, JsonResponse};
