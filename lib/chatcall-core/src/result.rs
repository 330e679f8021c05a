use crate::ChatNetworkError;

/// Normalized outcome of a [`ChatCall`](crate::ChatCall).
///
/// A `ChatResult` holds either the decoded payload or a [`ChatNetworkError`], never both.
/// It is produced exactly once, when the underlying exchange completes, and is immutable afterwards.
///
/// # Example
///
/// ```rust
/// use chatcall_core::{ChatNetworkError, ChatResult};
///
/// let ok = ChatResult::success(42);
/// assert!(ok.is_success());
/// assert_eq!(*ok.data(), 42);
///
/// let failed: ChatResult<u32> = ChatResult::failure(ChatNetworkError::new("bad filter", 17, 400));
/// assert!(!failed.is_success());
/// assert_eq!(failed.error().stream_code(), 17);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub enum ChatResult<T> {
    /// The call completed and the payload was decoded.
    Success(T),
    /// The call failed in transport, in decoding, or was rejected by the API.
    Failure(ChatNetworkError),
}

impl<T> ChatResult<T> {
    /// Creates a successful result.
    pub fn success(data: T) -> Self {
        Self::Success(data)
    }

    /// Creates a failed result.
    pub fn failure(error: ChatNetworkError) -> Self {
        Self::Failure(error)
    }

    /// Returns `true` if the result holds a payload.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the payload.
    ///
    /// # Panics
    ///
    /// Panics if the result is a failure. Check [`is_success`](Self::is_success) first,
    /// or use [`data_or_none`](Self::data_or_none).
    pub fn data(&self) -> &T {
        match self {
            Self::Success(data) => data,
            Self::Failure(error) => panic!("data() called on a failed ChatResult: {error}"),
        }
    }

    /// Returns the error.
    ///
    /// # Panics
    ///
    /// Panics if the result is a success. Check [`is_success`](Self::is_success) first,
    /// or use [`error_or_none`](Self::error_or_none).
    pub fn error(&self) -> &ChatNetworkError {
        match self {
            Self::Failure(error) => error,
            Self::Success(_) => panic!("error() called on a successful ChatResult"),
        }
    }

    /// Returns the payload if the result is a success.
    pub fn data_or_none(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error if the result is a failure.
    pub fn error_or_none(&self) -> Option<&ChatNetworkError> {
        match self {
            Self::Failure(error) => Some(error),
            Self::Success(_) => None,
        }
    }

    /// Consumes the result and returns the payload.
    ///
    /// # Panics
    ///
    /// Panics if the result is a failure.
    pub fn into_data(self) -> T {
        match self {
            Self::Success(data) => data,
            Self::Failure(error) => panic!("into_data() called on a failed ChatResult: {error}"),
        }
    }

    /// Consumes the result and returns the error.
    ///
    /// # Panics
    ///
    /// Panics if the result is a success.
    pub fn into_error(self) -> ChatNetworkError {
        match self {
            Self::Failure(error) => error,
            Self::Success(_) => panic!("into_error() called on a successful ChatResult"),
        }
    }

    /// Converts into a standard [`Result`], for use with `?`.
    ///
    /// # Errors
    ///
    /// Returns the [`ChatNetworkError`] held by a failed result.
    pub fn into_result(self) -> Result<T, ChatNetworkError> {
        self.into()
    }

    /// Applies `transform` to a successful payload; a failure passes through untouched
    /// and `transform` is never invoked.
    pub fn map<K, F>(self, transform: F) -> ChatResult<K>
    where
        F: FnOnce(T) -> K,
    {
        match self {
            Self::Success(data) => ChatResult::Success(transform(data)),
            Self::Failure(error) => ChatResult::Failure(error),
        }
    }
}

impl<T> From<ChatResult<T>> for Result<T, ChatNetworkError> {
    fn from(value: ChatResult<T>) -> Self {
        match value {
            ChatResult::Success(data) => Ok(data),
            ChatResult::Failure(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, ChatNetworkError>> for ChatResult<T> {
    fn from(value: Result<T, ChatNetworkError>) -> Self {
        match value {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Failure(error),
        }
    }
}
