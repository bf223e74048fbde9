//! Callback-style dispatch.
//!
//! Some callers prefer a pair of continuations to awaiting a future. This
//! spawns the request onto the current tokio runtime and calls exactly one
//! of the two handlers, exactly once, when it resolves. The caller returns
//! immediately.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::error::RestError;
use crate::http::ResponseMetadata;
use crate::response::{JsonObject, JsonResponse};

/// Spawn `request` and route its result to `on_success` or `on_failure`.
///
/// Must be called from within a tokio runtime.
pub fn dispatch_with_handlers<Fut, S, F>(request: Fut, on_success: S, on_failure: F) -> JoinHandle<()>
where
    Fut: Future<Output = Result<JsonResponse, RestError>> + Send + 'static,
    S: FnOnce(JsonObject, Option<ResponseMetadata>) + Send + 'static,
    F: FnOnce(RestError) + Send + 'static,
{
    tokio::spawn(async move {
        match request.await {
            Ok(JsonResponse { body, metadata }) => on_success(body, metadata),
            Err(e) => on_failure(e),
        }
    })
}
