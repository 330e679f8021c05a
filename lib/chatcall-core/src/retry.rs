//! Retrying calls on transient failures.
//!
//! A [`ChatCall`] is single-shot, so retries take a factory producing a fresh call for
//! each attempt.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, warn};

use crate::error::UNKNOWN_CODE;
use crate::{CallCancelled, ChatCall, ChatNetworkError, ChatResult};

type DecodeError = serde_path_to_error::Error<serde_json::Error>;

/// Exponential backoff used by [`execute_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    min_delay: Duration,
    max_delay: Duration,
    max_retries: usize,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            max_retries: 3,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Sets the delay before the first retry.
    #[must_use]
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    /// Caps the delay between two attempts.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets how many times a failed call is retried.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Enables or disables random jitter on delays.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Maximum number of retries.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);
        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Returns `true` if a failure is worth retrying.
///
/// Network failures, rate limiting (429) and server errors (5xx) are retried, even when
/// the error page of a 5xx could not be read. API rejections, successful responses whose
/// body does not decode, and cancelled calls are not.
pub fn is_retryable(error: &ChatNetworkError) -> bool {
    if error.cause_as::<CallCancelled>().is_some() {
        return false;
    }

    match error.status_code() {
        429 | 500..=599 => true,
        UNKNOWN_CODE => error.cause().is_some() && !is_decode_failure(error),
        _ => false,
    }
}

fn is_decode_failure(error: &ChatNetworkError) -> bool {
    error.cause_as::<DecodeError>().is_some() || error.cause_as::<serde_json::Error>().is_some()
}

/// Executes the calls produced by `factory` until one succeeds, a failure is not
/// [retryable](is_retryable), or the policy is exhausted.
///
/// The result of the last attempt is returned.
///
/// # Example
///
/// ```rust,no_run
/// use chatcall_core::ChatClient;
/// use chatcall_core::channels::QueryChannelsRequest;
/// use chatcall_core::retry::{RetryPolicy, execute_with_retry};
/// use serde_json::json;
///
/// # async fn example(client: ChatClient) {
/// let request = QueryChannelsRequest::new(json!({"type": "messaging"}), 0, 10);
/// let result = execute_with_retry(|| client.query_channels(&request), &RetryPolicy::default()).await;
/// # }
/// ```
pub async fn execute_with_retry<T, F>(mut factory: F, policy: &RetryPolicy) -> ChatResult<T>
where
    T: Send + 'static,
    F: FnMut() -> ChatCall<T>,
{
    let attempt = || {
        let call = factory();
        async move { call.execute().await.into_result() }
    };

    attempt
        .retry(policy.backoff())
        .when(is_retryable)
        .notify(|error, delay| {
            warn!(%error, ?delay, "call failed, retrying");
        })
        .await
        .inspect(|_| debug!("call succeeded"))
        .into()
}
