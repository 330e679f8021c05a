use std::borrow::Cow;
use std::error::Error;
use std::future::Future;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use tracing::debug;

/// Error raised by a transport before a response is available.
pub type TransportError = Box<dyn Error + Send + Sync + 'static>;

/// Response as received from the transport, before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Creates a response with the given status and body, and no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Sets the response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns `true` for a 2xx status.
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }
}

/// A single, not-yet-started request/response exchange.
///
/// The exchange starts when the returned future is first polled. Awaiting it runs the
/// exchange on the current task; a [`ChatCall`](crate::ChatCall) spawns it to run it in the
/// background. Dropping the future before completion cancels the exchange.
pub trait TransportCall: Send + 'static {
    /// Performs the exchange.
    ///
    /// Only failures that prevent obtaining a response are errors: a response with a
    /// non-successful status is still `Ok`.
    fn execute(self) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// [`TransportCall`] backed by a [`reqwest::Client`].
#[derive(Debug)]
pub struct ReqwestCall {
    client: reqwest::Client,
    request: reqwest::Request,
}

impl ReqwestCall {
    /// Wraps a prepared request.
    pub fn new(client: reqwest::Client, request: reqwest::Request) -> Self {
        Self { client, request }
    }

    /// The request that will be sent.
    pub fn request(&self) -> &reqwest::Request {
        &self.request
    }
}

impl TransportCall for ReqwestCall {
    async fn execute(self) -> Result<RawResponse, TransportError> {
        let Self { client, request } = self;

        debug!(method = %request.method(), url = %request.url(), "sending...");
        let response = client.execute(request).await?;
        debug!(status = %response.status(), "...receiving");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_consider_only_2xx_successful() {
        assert!(RawResponse::new(StatusCode::OK, "").is_successful());
        assert!(RawResponse::new(StatusCode::NO_CONTENT, "").is_successful());
        assert!(!RawResponse::new(StatusCode::FOUND, "").is_successful());
        assert!(!RawResponse::new(StatusCode::BAD_REQUEST, "").is_successful());
        assert!(!RawResponse::new(StatusCode::SERVICE_UNAVAILABLE, "").is_successful());
    }

    #[test]
    fn should_read_text_lossily() {
        let response = RawResponse::new(StatusCode::OK, vec![b'o', b'k', 0xff]);

        assert_eq!(response.text(), "ok\u{fffd}");
    }
}
