use http::header::{CONTENT_TYPE, HeaderName};
use http::HeaderValue;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ClientError;
use crate::transport::{RawResponse, ReqwestCall};
use crate::{CallMapper, ChatCall};

/// A prepared request of a [`ChatClient`](super::ChatClient).
///
/// Configure it with the `with_*` methods, then turn it into a [`ChatCall`] with
/// [`call`](Self::call), [`call_empty`](Self::call_empty), or [`call_raw`](Self::call_raw).
/// No I/O happens until that call is driven.
#[derive(Debug)]
pub struct ChatRequest {
    client: reqwest::Client,
    mapper: CallMapper,
    request: reqwest::Request,
}

impl ChatRequest {
    pub(super) fn new(client: reqwest::Client, mapper: CallMapper, request: reqwest::Request) -> Self {
        Self {
            client,
            mapper,
            request,
        }
    }

    /// The request that will be sent.
    pub fn request(&self) -> &reqwest::Request {
        &self.request
    }

    /// Appends query parameters, serialized with `serde_urlencoded`.
    ///
    /// # Errors
    ///
    /// Fails if `query` cannot be represented as a query string, e.g. nested structures.
    pub fn with_query<Q>(mut self, query: &Q) -> Result<Self, ClientError>
    where
        Q: Serialize + ?Sized,
    {
        let encoded = serde_urlencoded::to_string(query)?;
        if encoded.is_empty() {
            return Ok(self);
        }

        let url = self.request.url_mut();
        let merged = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
            _ => encoded,
        };
        url.set_query(Some(&merged));
        Ok(self)
    }

    /// Sets a header, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Fails if the name or the value is not valid in an HTTP header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.request.headers_mut().insert(name, value);
        Ok(self)
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Fails if `body` cannot be serialized to JSON.
    pub fn json<B>(mut self, body: &B) -> Result<Self, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(body)?;
        self.request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *self.request.body_mut() = Some(bytes.into());
        Ok(self)
    }

    /// Turns the request into a call decoding a JSON payload.
    pub fn call<T>(self) -> ChatCall<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (mapper, transport) = self.into_parts();
        mapper.map(transport)
    }

    /// Turns the request into a call ignoring the payload.
    pub fn call_empty(self) -> ChatCall<()> {
        let (mapper, transport) = self.into_parts();
        mapper.map_empty(transport)
    }

    /// Turns the request into a call returning the undecoded response.
    pub fn call_raw(self) -> ChatCall<RawResponse> {
        let (mapper, transport) = self.into_parts();
        mapper.map_raw(transport)
    }

    fn into_parts(self) -> (CallMapper, ReqwestCall) {
        let Self {
            client,
            mapper,
            request,
        } = self;
        (mapper, ReqwestCall::new(client, request))
    }
}
