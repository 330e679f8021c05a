use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::parser::{ErrorParser, JsonErrorParser};
use crate::transport::{RawResponse, TransportCall, TransportError};
use crate::{ChatCall, ChatNetworkError, ChatResult};

/// Adapts a [`TransportCall`] into a [`ChatCall`].
///
/// Every terminal state of the exchange maps to exactly one [`ChatResult`]:
///
/// | exchange outcome                         | result                                        |
/// |------------------------------------------|-----------------------------------------------|
/// | transport error                          | failure, [`ChatNetworkError::from_exception`] |
/// | 2xx, body decoded                        | success                                       |
/// | 2xx, body decoding failed                | failure, [`ChatNetworkError::from_exception`] |
/// | non-2xx                                  | failure, from the [`ErrorParser`]             |
///
/// # Example
///
/// ```rust
/// use chatcall_core::{CallMapper, RawResponse, TransportCall, TransportError};
/// use http::StatusCode;
/// use serde::Deserialize;
///
/// struct Canned;
///
/// impl TransportCall for Canned {
///     async fn execute(self) -> Result<RawResponse, TransportError> {
///         Ok(RawResponse::new(StatusCode::OK, r#"{"id":"a"}"#))
///     }
/// }
///
/// #[derive(Debug, Deserialize)]
/// struct Item {
///     id: String,
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let result = CallMapper::default().map::<Item, _>(Canned).execute().await;
/// assert_eq!(result.data().id, "a");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CallMapper {
    parser: Arc<dyn ErrorParser>,
}

impl Default for CallMapper {
    fn default() -> Self {
        Self::new(JsonErrorParser)
    }
}

impl CallMapper {
    /// Creates a mapper classifying API errors with `parser`.
    pub fn new(parser: impl ErrorParser + 'static) -> Self {
        Self {
            parser: Arc::new(parser),
        }
    }

    /// Creates a mapper sharing an existing parser.
    pub fn with_shared_parser(parser: Arc<dyn ErrorParser>) -> Self {
        Self { parser }
    }

    /// Maps a call whose successful body is JSON for `T`.
    pub fn map<T, C>(&self, call: C) -> ChatCall<T>
    where
        T: DeserializeOwned + Send + 'static,
        C: TransportCall,
    {
        self.map_with(call, decode_json)
    }

    /// Maps a call whose successful body is ignored.
    pub fn map_empty<C>(&self, call: C) -> ChatCall<()>
    where
        C: TransportCall,
    {
        self.map_with(call, |_| Ok(()))
    }

    /// Maps a call whose successful response is returned undecoded.
    pub fn map_raw<C>(&self, call: C) -> ChatCall<RawResponse>
    where
        C: TransportCall,
    {
        self.map_with(call, Ok)
    }

    /// Maps a call with a custom decoder for successful responses.
    ///
    /// A decoder error is classified like a transport error.
    pub fn map_with<T, C, D>(&self, call: C, decode: D) -> ChatCall<T>
    where
        T: Send + 'static,
        C: TransportCall,
        D: FnOnce(RawResponse) -> Result<T, TransportError> + Send + 'static,
    {
        let parser = Arc::clone(&self.parser);
        ChatCall::from_future(async move {
            match call.execute().await {
                Ok(response) => classify(response, parser.as_ref(), decode),
                Err(error) => {
                    warn!(%error, "transport failure");
                    ChatResult::failure(ChatNetworkError::from_exception(error))
                }
            }
        })
    }
}

fn classify<T, D>(response: RawResponse, parser: &dyn ErrorParser, decode: D) -> ChatResult<T>
where
    D: FnOnce(RawResponse) -> Result<T, TransportError>,
{
    if !response.is_successful() {
        let error = parser.to_error(&response);
        warn!(status = %response.status(), %error, "api error");
        return ChatResult::failure(error);
    }

    match decode(response) {
        Ok(data) => ChatResult::success(data),
        Err(error) => {
            warn!(%error, "fail to decode response body");
            ChatResult::failure(ChatNetworkError::from_exception(error))
        }
    }
}

fn decode_json<T>(response: RawResponse) -> Result<T, TransportError>
where
    T: DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_slice(response.body());
    let data = serde_path_to_error::deserialize(&mut deserializer)?;
    // only whitespace may follow the payload
    deserializer.end()?;
    Ok(data)
}
