use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::parser::{ErrorParser, JsonErrorParser};
use crate::transport::RawResponse;

/// Sentinel used for a status code that is not known, e.g. after a transport failure.
pub const UNKNOWN_CODE: i32 = -1;

/// Shared, type-erased cause of a [`ChatNetworkError`].
pub type ErrorCause = Arc<dyn Error + Send + Sync + 'static>;

/// Normalized error carried by a failed [`ChatResult`](crate::ChatResult).
///
/// Two kinds of failures end up here:
///
/// - **transport or decode failures**, built with [`from_exception`](Self::from_exception):
///   the cause is kept and both codes are [`UNKNOWN_CODE`];
/// - **API errors**, built from a non-successful response by an [`ErrorParser`]:
///   the codes come from the response and there is no cause.
///
/// Callers tell a network outage from an API rejection with
/// [`is_transport_failure`](Self::is_transport_failure).
#[derive(Debug, Clone)]
pub struct ChatNetworkError {
    message: String,
    cause: Option<ErrorCause>,
    stream_code: i32,
    status_code: i32,
}

impl ChatNetworkError {
    /// Creates an API error with known codes and no cause.
    pub fn new(message: impl Into<String>, stream_code: i32, status_code: i32) -> Self {
        Self {
            message: message.into(),
            cause: None,
            stream_code,
            status_code,
        }
    }

    /// Classifies an error raised while performing or decoding an exchange.
    ///
    /// The message is the cause's description and both codes are [`UNKNOWN_CODE`].
    pub fn from_exception<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        let cause: ErrorCause = Arc::from(error.into());
        Self {
            message: cause.to_string(),
            cause: Some(cause),
            stream_code: UNKNOWN_CODE,
            status_code: UNKNOWN_CODE,
        }
    }

    /// Sets the HTTP status of the response this error was derived from.
    ///
    /// Used when a non-successful response arrived but its body could not be read as an
    /// API error: the status stays known while `stream_code` remains unknown.
    #[must_use]
    pub fn with_status_code(mut self, status_code: i32) -> Self {
        self.status_code = status_code;
        self
    }

    /// Classifies a non-successful response with the default [`JsonErrorParser`].
    pub fn from_failed_response(response: &RawResponse) -> Self {
        JsonErrorParser.to_error(response)
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Underlying cause, present for transport and decode failures.
    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }

    /// Downcasts the cause to a concrete error type.
    pub fn cause_as<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.cause.as_deref().and_then(|cause| cause.downcast_ref::<E>())
    }

    /// Application-level error code reported by the API, or [`UNKNOWN_CODE`].
    pub fn stream_code(&self) -> i32 {
        self.stream_code
    }

    /// HTTP status code of the failed response, or [`UNKNOWN_CODE`].
    pub fn status_code(&self) -> i32 {
        self.status_code
    }

    /// Returns `true` if neither code is known.
    pub fn is_unknown_code(&self) -> bool {
        self.stream_code == UNKNOWN_CODE && self.status_code == UNKNOWN_CODE
    }

    /// Returns `true` if the error did not come from an API response.
    ///
    /// A body that does not decode is also reported this way; inspect the
    /// [`cause`](Self::cause) to tell both apart.
    pub fn is_transport_failure(&self) -> bool {
        self.is_unknown_code() && self.cause.is_some()
    }
}

impl fmt::Display for ChatNetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown_code() {
            write!(f, "{}", self.message)
        } else {
            write!(
                f,
                "{} (code: {}, status: {})",
                self.message, self.stream_code, self.status_code
            )
        }
    }
}

impl Error for ChatNetworkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn Error + 'static))
    }
}
