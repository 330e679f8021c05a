use std::time::Duration;

use http::Method;
use tracing::debug;
use url::Url;

use crate::CallMapper;

mod auth;
pub use self::auth::{Credentials, SecureString};

mod builder;
pub use self::builder::{ChatClientBuilder, DEFAULT_HOST};

mod error;
pub use self::error::ClientError;

mod request;
pub use self::request::ChatRequest;

/// Query parameter carrying the API key.
const API_KEY_PARAM: &str = "api_key";

/// Configured client of the chat API.
///
/// A `ChatClient` prepares requests; it never performs I/O by itself. Every request ends
/// as a [`ChatCall`](crate::ChatCall), and the caller chooses how to drive it.
/// Use [`ChatClientBuilder`] to create instances.
///
/// # Example
///
/// ```rust,no_run
/// use chatcall_core::{ChatClient, Credentials};
/// # use serde::Deserialize;
/// # #[derive(Debug, Deserialize)]
/// # struct Me { id: String }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ChatClient::builder()
///     .with_credentials(Credentials::new("app-key").with_user_token("jwt"))
///     .build()?;
///
/// let result = client.get("/users/me")?.call::<Me>().await;
/// if result.is_success() {
///     println!("hello {}", result.data().id);
/// } else {
///     eprintln!("failed: {}", result.error());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
    credentials: Option<Credentials>,
    mapper: CallMapper,
}

// Create
impl ChatClient {
    /// Creates a builder with the default configuration.
    pub fn builder() -> ChatClientBuilder {
        ChatClientBuilder::default()
    }

    /// Base URL every request path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Mapper turning exchanges into [`ChatCall`](crate::ChatCall)s.
    pub fn mapper(&self) -> &CallMapper {
        &self.mapper
    }
}

// Requests
impl ChatClient {
    /// Prepares a request to `path`, relative to the base URL.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be built or the credentials cannot be sent as headers.
    pub fn request(&self, method: Method, path: &str) -> Result<ChatRequest, ClientError> {
        self.request_at(method, path.split('/').filter(|segment| !segment.is_empty()))
    }

    /// Prepares a request to the given path segments, relative to the base URL.
    ///
    /// Each segment is percent-encoded, so identifiers containing `/` or spaces are safe.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be built or the credentials cannot be sent as headers.
    pub fn request_at<I, S>(&self, method: Method, segments: I) -> Result<ChatRequest, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBasePath {
                error: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);

        if let Some(credentials) = &self.credentials {
            url.query_pairs_mut()
                .append_pair(API_KEY_PARAM, credentials.api_key());
        }

        let mut request = reqwest::Request::new(method, url);
        if let Some(credentials) = &self.credentials {
            credentials.apply_headers(request.headers_mut())?;
        }
        *request.timeout_mut() = self.timeout;

        debug!(method = %request.method(), path = request.url().path(), "request prepared");
        Ok(ChatRequest::new(
            self.client.clone(),
            self.mapper.clone(),
            request,
        ))
    }

    /// Prepares a `GET` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn get(&self, path: &str) -> Result<ChatRequest, ClientError> {
        self.request(Method::GET, path)
    }

    /// Prepares a `POST` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn post(&self, path: &str) -> Result<ChatRequest, ClientError> {
        self.request(Method::POST, path)
    }

    /// Prepares a `PUT` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn put(&self, path: &str) -> Result<ChatRequest, ClientError> {
        self.request(Method::PUT, path)
    }

    /// Prepares a `PATCH` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn patch(&self, path: &str) -> Result<ChatRequest, ClientError> {
        self.request(Method::PATCH, path)
    }

    /// Prepares a `DELETE` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn delete(&self, path: &str) -> Result<ChatRequest, ClientError> {
        self.request(Method::DELETE, path)
    }
}

#[cfg(test)]
mod tests {
    use http::header::AUTHORIZATION;

    use super::*;

    fn client() -> ChatClient {
        ChatClient::builder()
            .with_host("localhost")
            .with_port(8443)
            .with_base_path("/v1")
            .expect("valid base path")
            .with_timeout(Duration::from_secs(2))
            .with_credentials(Credentials::new("app-key").with_user_token("jwt-token"))
            .build()
            .expect("should build client")
    }

    #[test]
    fn should_resolve_path_against_base_url() {
        let request = client().get("/channels").expect("valid request");

        insta::assert_snapshot!(request.request().url(), @"https://localhost:8443/v1/channels?api_key=app-key");
    }

    #[test]
    fn should_encode_path_segments() {
        let request = client()
            .request_at(Method::DELETE, ["channels", "messaging", "general chat/1"])
            .expect("valid request");

        insta::assert_snapshot!(request.request().url().path(), @"/v1/channels/messaging/general%20chat%2F1");
    }

    #[test]
    fn should_send_credentials_and_timeout() {
        let request = client().post("channels/messaging/general").expect("valid request");
        let request = request.request();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.headers()[AUTHORIZATION], "jwt-token");
        assert_eq!(request.headers()["stream-auth-type"], "jwt");
        assert_eq!(request.timeout(), Some(&Duration::from_secs(2)));
    }

    #[test]
    fn should_not_add_api_key_without_credentials() {
        let client = ChatClient::builder()
            .build()
            .expect("should build client");

        let request = client.get("/app").expect("valid request");

        assert!(request.request().url().query().is_none());
        assert!(request.request().headers().is_empty());
    }
}
