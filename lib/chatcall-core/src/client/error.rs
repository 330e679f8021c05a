/// Errors raised while configuring a [`ChatClient`](super::ChatClient) or preparing a request.
///
/// These happen before any [`ChatCall`](crate::ChatCall) exists. Failures of the exchange
/// itself are never reported here: they are normalized into a [`ChatResult`](crate::ChatResult).
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ClientError {
    /// URL parsing error when constructing request URLs.
    UrlError(url::ParseError),

    /// HTTP protocol error from the http crate.
    ///
    /// Occurs when the base URI cannot be assembled from scheme, host, and port.
    HttpError(http::Error),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error of a request body.
    JsonValueError(serde_json::Error),

    /// Query parameter serialization error.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// Invalid base path configuration.
    #[display("Invalid base path: {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// Description of why the base path is invalid.
        error: String,
    },

    /// Credential cannot be sent in a header.
    #[display("Invalid credentials: {message}")]
    #[from(skip)]
    InvalidCredentials {
        /// Description of the invalid characters or format issue.
        message: String,
    },
}
