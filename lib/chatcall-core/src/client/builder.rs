use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use http::Uri;
use http::uri::{PathAndQuery, Scheme};
use url::Url;

use super::{ChatClient, ClientError, Credentials};
use crate::CallMapper;
use crate::parser::{ErrorParser, JsonErrorParser};

/// Default host of the hosted chat API.
pub const DEFAULT_HOST: &str = "chat.stream-io-api.com";

/// Builder for [`ChatClient`] instances.
///
/// # Default Configuration
///
/// - **Scheme**: HTTPS
/// - **Host**: [`DEFAULT_HOST`]
/// - **Port**: 443
/// - **Base path**: None (requests go to root path)
/// - **Timeout**: None (no per-request timeout)
/// - **Credentials**: None
/// - **Error parser**: [`JsonErrorParser`]
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use chatcall_core::{ChatClient, Credentials};
/// use http::uri::Scheme;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ChatClient::builder()
///     .with_scheme(Scheme::HTTP)
///     .with_host("localhost")
///     .with_port(8080)
///     .with_base_path("/v1")?
///     .with_timeout(Duration::from_secs(10))
///     .with_credentials(Credentials::new("app-key").with_user_token("jwt"))
///     .build()?;
///
/// assert_eq!(client.base_url().as_str(), "http://localhost:8080/v1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatClientBuilder {
    client: reqwest::Client,
    scheme: Scheme,
    host: String,
    port: u16,
    base_path: Option<PathAndQuery>,
    timeout: Option<Duration>,
    credentials: Option<Credentials>,
    parser: Arc<dyn ErrorParser>,
}

impl ChatClientBuilder {
    /// Builds the [`ChatClient`].
    ///
    /// # Errors
    ///
    /// This method can fail if:
    /// - The base URI cannot be constructed from the provided scheme, host, and port
    /// - The resulting URI is not a valid URL
    pub fn build(self) -> Result<ChatClient, ClientError> {
        let Self {
            client,
            scheme,
            host,
            port,
            base_path,
            timeout,
            credentials,
            parser,
        } = self;

        let authority = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        };
        let builder = Uri::builder().scheme(scheme).authority(authority);
        let builder = if let Some(path) = &base_path {
            builder.path_and_query(path.path())
        } else {
            builder.path_and_query("/")
        };

        let base_uri = builder.build()?;
        let base_url = base_uri.to_string().parse::<Url>()?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBasePath {
                error: format!("{base_url} cannot be a base URL"),
            });
        }

        Ok(ChatClient {
            client,
            base_url,
            timeout,
            credentials,
            mapper: CallMapper::with_shared_parser(parser),
        })
    }

    /// Uses a preconfigured [`reqwest::Client`], e.g. to share a connection pool or set proxies.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Sets the HTTP scheme.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the hostname or IP address of the API server.
    ///
    /// IPv6 literals may be given with or without brackets.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the base path prepended to every request path.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBasePath`] if the path is not a valid URI path.
    pub fn with_base_path<P>(mut self, base_path: P) -> Result<Self, ClientError>
    where
        P: TryInto<PathAndQuery>,
        P::Error: Debug + 'static,
    {
        let base_path = base_path
            .try_into()
            .map_err(|err| ClientError::InvalidBasePath {
                error: format!("{err:?}"),
            })?;
        self.base_path = Some(base_path);
        Ok(self)
    }

    /// Sets a timeout applied to every request, from sending until the body is read.
    ///
    /// An elapsed timeout is a transport failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the credentials sent with every request.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the parser classifying non-successful responses.
    pub fn with_error_parser(mut self, parser: impl ErrorParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }
}

impl Default for ChatClientBuilder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            scheme: Scheme::HTTPS,
            host: DEFAULT_HOST.to_string(),
            port: 443,
            base_path: None,
            timeout: None,
            credentials: None,
            parser: Arc::new(JsonErrorParser),
        }
    }
}
