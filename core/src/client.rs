//! Request construction and the public REST client.
//!
//! # Design
//! `RestClient` owns a transport handle and read-only configuration; it keeps
//! no state between calls, so clones can be used concurrently. Every verb is
//! split in two, as in a host-does-IO client:
//!
//! - `build_*` is pure and produces an `HttpRequest` or fails before anything
//!   is sent;
//! - the async verb hands that request to the transport and classifies what
//!   comes back.
//!
//! All builders funnel into `build_request`. The body is encoded first: if
//! that fails, headers are never examined. Caller headers are then validated
//! as a whole, and finally the builder sets `Content-Type` for requests that
//! carry a body, replacing any caller-supplied value.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};
use url::Url;

use crate::config::RestClientConfig;
use crate::content::Serializable;
use crate::error::{RestError, SerializationError};
use crate::headers::HeaderPolicy;
use crate::http::{HttpMethod, HttpRequest, HttpTransport};
use crate::multipart::{self, FormPart};
use crate::response::{classify, JsonResponse};

const CONTENT_TYPE: &str = "Content-Type";

/// What, if anything, a request carries as its body.
#[derive(Clone, Copy)]
pub enum RequestBody<'a> {
    Empty,
    Content(&'a dyn Serializable),
    Multipart(&'a [FormPart]),
}

/// REST client bound to one transport.
#[derive(Debug)]
pub struct RestClient<T> {
    transport: Arc<T>,
    config: Arc<RestClientConfig>,
    policy: HeaderPolicy,
}

impl<T> Clone for RestClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            policy: self.policy,
        }
    }
}

impl<T> RestClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, RestClientConfig::default())
    }

    pub fn with_config(transport: T, config: RestClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
            policy: HeaderPolicy,
        }
    }

    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_get<I, K, V>(&self, url: Url, headers: I) -> Result<HttpRequest, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.build_request(HttpMethod::Get, url, headers, RequestBody::Empty)
    }

    pub fn build_post<I, K, V>(
        &self,
        url: Url,
        headers: I,
        content: &dyn Serializable,
    ) -> Result<HttpRequest, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.build_request(HttpMethod::Post, url, headers, RequestBody::Content(content))
    }

    pub fn build_post_multipart<I, K, V>(
        &self,
        url: Url,
        headers: I,
        parts: &[FormPart],
    ) -> Result<HttpRequest, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.build_request(HttpMethod::Post, url, headers, RequestBody::Multipart(parts))
    }

    pub fn build_delete<I, K, V>(&self, url: Url, headers: I) -> Result<HttpRequest, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.build_request(HttpMethod::Delete, url, headers, RequestBody::Empty)
    }

    /// Assemble a transport-ready request.
    ///
    /// Fails with `RestError::DataSerialization` if the body cannot be
    /// encoded, or with `RestError::ForbiddenHeader` for the first caller
    /// header the policy rejects.
    pub fn build_request<I, K, V>(
        &self,
        method: HttpMethod,
        url: Url,
        headers: I,
        body: RequestBody<'_>,
    ) -> Result<HttpRequest, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let encoded = self.encode_body(body).map_err(|e| {
            warn!(%method, %url, error = %e, "request body could not be serialized");
            RestError::DataSerialization(e)
        })?;

        let mut headers = self.policy.apply(headers, encoded.is_some())?;

        let body = encoded.map(|(bytes, content_type)| {
            headers.retain(|(key, _)| !key.eq_ignore_ascii_case(CONTENT_TYPE));
            headers.push((CONTENT_TYPE.to_string(), content_type));
            bytes
        });

        debug!(
            %method,
            %url,
            headers = headers.len(),
            body_len = body.as_ref().map(|b| b.len()),
            "built request"
        );
        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    fn encode_body(
        &self,
        body: RequestBody<'_>,
    ) -> Result<Option<(Bytes, String)>, SerializationError> {
        match body {
            RequestBody::Empty => Ok(None),
            RequestBody::Content(content) => {
                let bytes = content.as_bytes()?;
                Ok(Some((bytes, content.content_type().to_string())))
            }
            RequestBody::Multipart(parts) => {
                let boundary = self.config.boundary.boundary();
                let bytes = multipart::encode(parts, &boundary)?;
                Ok(Some((bytes, multipart::content_type_for(&boundary))))
            }
        }
    }
}

impl<T: HttpTransport> RestClient<T> {
    pub async fn get<I, K, V>(&self, url: Url, headers: I) -> Result<JsonResponse, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = self.build_get(url, headers)?;
        self.send(request).await
    }

    pub async fn post<I, K, V>(
        &self,
        url: Url,
        headers: I,
        content: &dyn Serializable,
    ) -> Result<JsonResponse, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = self.build_post(url, headers, content)?;
        self.send(request).await
    }

    pub async fn post_multipart<I, K, V>(
        &self,
        url: Url,
        headers: I,
        parts: &[FormPart],
    ) -> Result<JsonResponse, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = self.build_post_multipart(url, headers, parts)?;
        self.send(request).await
    }

    pub async fn delete<I, K, V>(&self, url: Url, headers: I) -> Result<JsonResponse, RestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = self.build_delete(url, headers)?;
        self.send(request).await
    }

    /// Dispatch an already built request and classify the outcome.
    pub async fn send(&self, request: HttpRequest) -> Result<JsonResponse, RestError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "dispatching request");
        let outcome = self.transport.dispatch(request).await;
        let result = classify(outcome);
        match &result {
            Ok(response) => debug!(%method, %url, status = ?response.status(), "request succeeded"),
            Err(e) => debug!(%method, %url, error = %e, "request failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::config::BoundaryStrategy;
    use crate::content::{Json, TypedBytes};
    use crate::http::{ResponseMetadata, TransportError, TransportOutcome};

    /// Records every dispatched request and answers with a canned reply.
    struct RecordingTransport {
        requests: Mutex<Vec<HttpRequest>>,
        reply: fn() -> TransportOutcome,
    }

    impl RecordingTransport {
        fn replying(reply: fn() -> TransportOutcome) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn ok() -> Self {
            Self::replying(|| {
                TransportOutcome::completed(&br#"{"ok":true}"#[..], Some(ResponseMetadata::new(200)))
            })
        }

        fn dispatched(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn dispatch(&self, request: HttpRequest) -> TransportOutcome {
            self.requests.lock().unwrap().push(request);
            (self.reply)()
        }
    }

    struct Unencodable;

    impl Serializable for Unencodable {
        fn as_bytes(&self) -> Result<Bytes, SerializationError> {
            Err(SerializationError::Other("cannot encode".to_string()))
        }

        fn content_type(&self) -> &str {
            "application/x-unencodable"
        }
    }

    fn url() -> Url {
        Url::parse("http://localhost:3000/resource").unwrap()
    }

    fn fixed_client() -> RestClient<RecordingTransport> {
        RestClient::with_config(
            RecordingTransport::ok(),
            RestClientConfig::default().with_boundary(BoundaryStrategy::Fixed("XYZ".to_string())),
        )
    }

    #[test]
    fn get_applies_permitted_headers_unchanged() {
        let headers = [("Accept", "application/json"), ("X-Request-Id", "42"), ("Content-Length", "0")];
        let req = fixed_client().build_get(url(), headers).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, url());
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn forbidden_headers_are_rejected_for_every_verb() {
        let client = fixed_client();
        for key in crate::headers::FORBIDDEN_HEADERS {
            let headers = [("X-Fine", "1"), (key, "value")];
            for result in [
                client.build_get(url(), headers),
                client.build_delete(url(), headers),
                client.build_post(url(), headers, &"text"),
                client.build_post_multipart(url(), headers, &[]),
            ] {
                assert!(matches!(result, Err(RestError::ForbiddenHeader(k)) if k == key));
            }
        }
    }

    #[test]
    fn content_length_is_rejected_only_with_a_body() {
        let client = fixed_client();
        let headers = [("Content-Length", "10")];
        let err = client.build_post(url(), headers, &Json(json!({"k": "v"}))).unwrap_err();
        assert!(matches!(err, RestError::ForbiddenHeader(k) if k == "Content-Length"));
        let err = client.build_post_multipart(url(), headers, &[]).unwrap_err();
        assert!(matches!(err, RestError::ForbiddenHeader(k) if k == "Content-Length"));
        assert!(client.build_get(url(), headers).is_ok());
        assert!(client.build_delete(url(), headers).is_ok());
    }

    #[test]
    fn body_failure_takes_precedence_over_header_failure() {
        let err = fixed_client()
            .build_post(url(), [("Authorization", "Bearer x")], &Unencodable)
            .unwrap_err();
        assert!(matches!(err, RestError::DataSerialization(SerializationError::Other(_))));
    }

    #[test]
    fn post_json_sets_content_type_and_body() {
        let content = Json(json!({"k": "v"}));
        let req = fixed_client()
            .build_post(url(), Vec::<(String, String)>::new(), &content)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        let expected = serde_json::to_vec(&json!({"k": "v"})).unwrap();
        assert_eq!(req.body.as_deref(), Some(&expected[..]));
    }

    #[test]
    fn builder_content_type_replaces_caller_value() {
        let req = fixed_client()
            .build_post(
                url(),
                [("content-type", "text/html"), ("Accept", "*/*")],
                &TypedBytes::new(&b"<x/>"[..], "application/xml"),
            )
            .unwrap();
        assert_eq!(
            req.headers,
            vec![
                ("Accept".to_string(), "*/*".to_string()),
                ("Content-Type".to_string(), "application/xml".to_string()),
            ]
        );
    }

    #[test]
    fn multipart_sets_boundary_content_type() {
        let parts = [FormPart::new("file", "a.txt", "alpha")];
        let req = fixed_client()
            .build_post_multipart(url(), [("X-Upload", "yes")], &parts)
            .unwrap();
        assert_eq!(req.header("Content-Type"), Some("multipart/form-data; boundary=XYZ"));
        assert_eq!(req.header("X-Upload"), Some("yes"));
        assert_eq!(req.body.unwrap(), multipart::encode(&parts, "XYZ").unwrap());
    }

    #[test]
    fn multipart_part_failure_is_data_serialization() {
        let parts = [FormPart::new("ok", "ok.txt", "fine"), FormPart::new("bad", "bad", Unencodable)];
        let err = fixed_client()
            .build_post_multipart(url(), Vec::<(&str, &str)>::new(), &parts)
            .unwrap_err();
        assert!(matches!(err, RestError::DataSerialization(_)));
    }

    #[test]
    fn per_request_boundary_matches_body() {
        let client = RestClient::new(RecordingTransport::ok());
        let parts = [FormPart::new("f", "f.txt", "x")];
        let req = client.build_post_multipart(url(), Vec::<(&str, &str)>::new(), &parts).unwrap();
        let content_type = req.header("Content-Type").unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap()
            .to_string();
        let body = req.body.unwrap();
        assert!(body.starts_with(format!("--{boundary}\r\n").as_bytes()));
        assert!(body.ends_with(format!("--{boundary}--\r\n").as_bytes()));
    }

    #[test]
    fn delete_has_no_body() {
        let req = fixed_client().build_delete(url(), [("X-Reason", "cleanup")]).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn verbs_dispatch_and_classify() {
        let client = fixed_client();
        let ok = client.get(url(), [("Accept", "application/json")]).await.unwrap();
        assert_eq!(ok.body["ok"], true);
        assert_eq!(ok.status(), Some(200));

        client.post(url(), Vec::<(&str, &str)>::new(), &"hello").await.unwrap();
        client
            .post_multipart(url(), Vec::<(&str, &str)>::new(), &[FormPart::new("a", "a", "1")])
            .await
            .unwrap();
        client.delete(url(), Vec::<(&str, &str)>::new()).await.unwrap();

        let methods: Vec<_> = client.transport().dispatched().iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Post, HttpMethod::Delete]
        );
    }

    #[tokio::test]
    async fn rejected_requests_are_never_dispatched() {
        let client = fixed_client();
        let err = client.get(url(), [("Host", "evil")]).await.unwrap_err();
        assert!(matches!(err, RestError::ForbiddenHeader(_)));
        let err = client.post(url(), Vec::<(&str, &str)>::new(), &Unencodable).await.unwrap_err();
        assert!(matches!(err, RestError::DataSerialization(_)));
        assert!(client.transport().dispatched().is_empty());
    }

    #[tokio::test]
    async fn transport_outcomes_map_to_errors() {
        let client = RestClient::new(RecordingTransport::replying(|| {
            TransportOutcome::failed(TransportError::new("connection reset"), None)
        }));
        let err = client.get(url(), Vec::<(&str, &str)>::new()).await.unwrap_err();
        assert!(matches!(err, RestError::Network(_)));

        let client = RestClient::new(RecordingTransport::replying(|| {
            TransportOutcome::empty(Some(ResponseMetadata::new(204)))
        }));
        let err = client.delete(url(), Vec::<(&str, &str)>::new()).await.unwrap_err();
        assert!(matches!(err, RestError::NoDataReturned));

        let client = RestClient::new(RecordingTransport::replying(|| {
            TransportOutcome::completed(&b"<html>"[..], Some(ResponseMetadata::new(200)))
        }));
        let err = client.get(url(), Vec::<(&str, &str)>::new()).await.unwrap_err();
        assert!(matches!(err, RestError::JsonSerialization(_)));
    }
}
