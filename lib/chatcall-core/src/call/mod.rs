use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::{ChatNetworkError, ChatResult};

mod cancel;
pub use self::cancel::{CallCancelled, CancelToken};


type CallTask<T> = Pin<Box<dyn Future<Output = ChatResult<T>> + Send>>;

/// A deferred, cancellable, single-shot unit of network work.
///
/// Nothing happens until the call is driven, either with [`execute`](Self::execute)
/// (or `.await`) on the current task, or with [`enqueue`](Self::enqueue) in the background.
/// Every terminal outcome of the exchange is normalized into exactly one [`ChatResult`].
///
/// Driving a call consumes it, so a call cannot be executed twice:
///
/// ```rust,compile_fail
/// # use chatcall_core::{ChatCall, ChatResult};
/// # async fn example() {
/// let call = ChatCall::ready(ChatResult::success(1));
/// let _ = call.execute().await;
/// let _ = call.execute().await; // use of moved value
/// # }
/// ```
///
/// # Example
///
/// ```rust
/// use chatcall_core::{ChatCall, ChatResult};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let call = ChatCall::ready(ChatResult::success(vec!["general", "random"]))
///     .map(|channels| channels.len());
///
/// let result = call.await;
/// assert_eq!(*result.data(), 2);
/// # }
/// ```
#[must_use = "a call does nothing until it is executed or enqueued"]
pub struct ChatCall<T> {
    task: CallTask<T>,
    cancel: CancelToken,
}

impl<T> fmt::Debug for ChatCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCall")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<T> ChatCall<T>
where
    T: Send + 'static,
{
    /// Wraps a future producing the call outcome. The future is not polled until the call
    /// is driven.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = ChatResult<T>> + Send + 'static,
    {
        Self {
            task: Box::pin(future),
            cancel: CancelToken::new(),
        }
    }

    /// A call that resolves to `result` without any I/O.
    pub fn ready(result: ChatResult<T>) -> Self {
        Self::from_future(std::future::ready(result))
    }

    /// A call that resolves to a failure without any I/O.
    pub fn failed(error: ChatNetworkError) -> Self {
        Self::ready(ChatResult::failure(error))
    }

    /// Requests cancellation.
    ///
    /// Idempotent. Cancellation races with completion: a result already being delivered
    /// is not retracted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token observing and controlling the cancellation of this call.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drives the call on the current task and returns its outcome.
    ///
    /// If the call is cancelled before or while running, the in-flight exchange is dropped
    /// and the result is a failure caused by [`CallCancelled`].
    pub async fn execute(self) -> ChatResult<T> {
        let Self { task, cancel } = self;
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                trace!("call cancelled before completion");
                ChatResult::failure(ChatNetworkError::from_exception(CallCancelled))
            }
            result = task => result,
        }
    }

    /// Drives the call in the background and returns immediately.
    ///
    /// `on_result` runs at most once, on a runtime worker thread that is generally not the
    /// calling thread. It does not run if the call is cancelled before its outcome is
    /// available.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn enqueue<F>(self, on_result: F) -> CallHandle
    where
        F: FnOnce(ChatResult<T>) + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let join = tokio::spawn(async move {
            let Self { task, cancel } = self;
            if cancel.is_cancelled() {
                trace!("skipping cancelled call");
                return;
            }

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                result = task => Some(result),
            };

            match outcome {
                Some(result) if !cancel.is_cancelled() => on_result(result),
                _ => trace!("call cancelled, result dropped"),
            }
        });

        CallHandle { cancel, join }
    }

    /// Derives a call that applies `transform` to a successful payload.
    ///
    /// A failure passes through unchanged and `transform` is not invoked. The derived call
    /// shares the cancellation state of this one.
    pub fn map<K, F>(self, transform: F) -> ChatCall<K>
    where
        K: Send + 'static,
        F: FnOnce(T) -> K + Send + 'static,
    {
        let Self { task, cancel } = self;
        ChatCall {
            task: Box::pin(async move { task.await.map(transform) }),
            cancel,
        }
    }
}

/// Lets a call be awaited directly: `call.await` is `call.execute().await`.
impl<T> IntoFuture for ChatCall<T>
where
    T: Send + 'static,
{
    type Output = ChatResult<T>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

/// Handle on an [enqueued](ChatCall::enqueue) call.
///
/// Dropping the handle does not cancel the call.
#[derive(Debug)]
pub struct CallHandle {
    cancel: CancelToken,
    join: JoinHandle<()>,
}

impl CallHandle {
    /// Requests cancellation of the call.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `true` once the background task is done, whether or not the callback ran.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the background task to be done.
    pub async fn join(self) {
        if let Err(error) = self.join.await {
            warn!(%error, "enqueued call did not complete");
        }
    }
}
