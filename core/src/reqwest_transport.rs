//! `HttpTransport` backed by `reqwest`.

use async_trait::async_trait;
use tracing::debug;

use crate::http::{HttpMethod, HttpRequest, HttpTransport, ResponseMetadata, TransportError, TransportOutcome};

/// Sends requests through a shared `reqwest::Client`.
///
/// Connection pooling, TLS, redirects and timeouts are whatever the wrapped
/// client is configured with. A zero-length response body is reported as no
/// data.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn metadata(response: &reqwest::Response) -> ResponseMetadata {
    ResponseMetadata {
        status: response.status().as_u16(),
        headers: response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect(),
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn dispatch(&self, request: HttpRequest) -> TransportOutcome {
        let HttpRequest {
            method: verb,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method(verb), url);
        for (key, value) in &headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "reqwest send failed");
                return TransportOutcome::failed(TransportError::from_source(e), None);
            }
        };

        let meta = metadata(&response);
        match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => TransportOutcome::empty(Some(meta)),
            Ok(bytes) => TransportOutcome::completed(bytes, Some(meta)),
            Err(e) => TransportOutcome::failed(TransportError::from_source(e), Some(meta)),
        }
    }
}
