use std::fmt;

use http::header::{AUTHORIZATION, HeaderName};
use http::{HeaderMap, HeaderValue};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::ClientError;

const STREAM_AUTH_TYPE: &str = "stream-auth-type";

/// User token kept out of logs.
///
/// The bytes are zeroed when the value is dropped and `Debug` never prints them.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a token.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// The token, for building the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecureString").field(&"[REDACTED]").finish()
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Credentials of the chat API.
///
/// The API key identifies the application and travels as the `api_key` query parameter.
/// The optional user token is a JWT sent in the `Authorization` header, along with
/// `stream-auth-type: jwt`.
///
/// # Example
///
/// ```rust
/// use chatcall_core::Credentials;
///
/// let credentials = Credentials::new("app-key").with_user_token("eyJhbGciOi...");
/// assert_eq!(credentials.api_key(), "app-key");
/// assert!(format!("{credentials:?}").contains("[REDACTED]"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    user_token: Option<SecureString>,
}

impl Credentials {
    /// Creates credentials for anonymous access with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            user_token: None,
        }
    }

    /// Adds the user token.
    #[must_use]
    pub fn with_user_token(mut self, token: impl Into<SecureString>) -> Self {
        self.user_token = Some(token.into());
        self
    }

    /// The API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The user token, if any.
    pub fn user_token(&self) -> Option<&SecureString> {
        self.user_token.as_ref()
    }

    pub(super) fn apply_headers(&self, headers: &mut HeaderMap) -> Result<(), ClientError> {
        let Some(token) = &self.user_token else {
            return Ok(());
        };

        let mut value =
            HeaderValue::from_str(token.as_str()).map_err(|err| ClientError::InvalidCredentials {
                message: err.to_string(),
            })?;
        value.set_sensitive(true);

        headers.insert(AUTHORIZATION, value);
        headers.insert(
            HeaderName::from_static(STREAM_AUTH_TYPE),
            HeaderValue::from_static("jwt"),
        );
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("user_token", &self.user_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
