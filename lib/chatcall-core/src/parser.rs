use std::fmt::Debug;

use serde::Deserialize;
use tracing::debug;

use crate::error::UNKNOWN_CODE;
use crate::transport::TransportError;
use crate::{ChatNetworkError, RawResponse};

/// Decodes the body of a non-successful response into a [`ChatNetworkError`].
///
/// Implementations must not panic: a body that cannot be decoded is reported with
/// [`ChatNetworkError::from_exception`] on the decoding error, keeping the HTTP status.
pub trait ErrorParser: Debug + Send + Sync {
    /// Builds the error for a response whose status is not successful.
    fn to_error(&self, response: &RawResponse) -> ChatNetworkError;
}

/// [`ErrorParser`] for the JSON error payload of the chat API.
///
/// The expected body is:
///
/// ```json
/// {"message": "bad filter", "code": 17, "StatusCode": 400}
/// ```
///
/// `code` defaults to [`UNKNOWN_CODE`] when absent, and `StatusCode` defaults to the
/// HTTP status of the response.
///
/// A body that is not such a payload, e.g. a proxy's HTML error page, yields an error
/// with an unknown `stream_code`, the HTTP status, and the parse error as cause.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorParser;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default = "unknown_code")]
    code: i32,
    #[serde(rename = "StatusCode")]
    status_code: Option<i32>,
}

fn unknown_code() -> i32 {
    UNKNOWN_CODE
}

impl ErrorParser for JsonErrorParser {
    fn to_error(&self, response: &RawResponse) -> ChatNetworkError {
        let http_status = i32::from(response.status().as_u16());
        match parse_body(response.body()) {
            Ok(ErrorBody {
                message,
                code,
                status_code,
            }) => ChatNetworkError::new(message, code, status_code.unwrap_or(http_status)),
            Err(error) => {
                debug!(%error, status = %response.status(), "malformed error body");
                ChatNetworkError::from_exception(error).with_status_code(http_status)
            }
        }
    }
}

fn parse_body(body: &[u8]) -> Result<ErrorBody, TransportError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let parsed = serde_path_to_error::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(parsed)
}
