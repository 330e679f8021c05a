//! # Chatcall Core
//!
//! Deferred, cancellable network calls for a hosted chat API, with every outcome
//! normalized into a single result type.
//!
//! - **[`ChatCall`]** - a single-shot unit of work: [`execute`](ChatCall::execute) it on the
//!   current task, [`enqueue`](ChatCall::enqueue) it with a callback, [`cancel`](ChatCall::cancel)
//!   it, or [`map`](ChatCall::map) its payload
//! - **[`ChatResult`]** - payload or [`ChatNetworkError`], never both
//! - **[`CallMapper`]** - turns any [`TransportCall`] into a [`ChatCall`]
//! - **[`ChatClient`]** - a configured client whose operations all return a [`ChatCall`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatcall_core::channels::{QueryChannelsRequest, SortField};
//! use chatcall_core::{ChatClient, Credentials};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChatClient::builder()
//!     .with_credentials(Credentials::new("app-key").with_user_token("user-jwt"))
//!     .build()?;
//!
//! let request = QueryChannelsRequest::new(json!({"members": {"$in": ["thierry"]}}), 0, 10)
//!     .with_sort(SortField::desc("last_message_at"));
//!
//! // Awaiting a call drives it on the current task
//! let result = client.query_channels(&request).await;
//! if result.is_success() {
//!     println!("{} channels", result.data().len());
//! }
//!
//! // Enqueuing runs it in the background, the callback runs on a runtime worker
//! let handle = client.query_channels(&request).enqueue(|result| {
//!     if let Some(error) = result.error_or_none() {
//!         eprintln!("query failed: {error}");
//!     }
//! });
//! handle.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Classification
//!
//! | outcome                                   | `stream_code` / `status_code` | `cause`         |
//! |-------------------------------------------|-------------------------------|-----------------|
//! | transport failure (connection, timeout)   | unknown (`-1`)                | transport error |
//! | 2xx with a body that does not decode      | unknown (`-1`)                | decode error    |
//! | non-2xx with an API error body            | parsed from the body          | none            |
//! | non-2xx with a malformed error body       | unknown (`-1`) / HTTP status  | parse error     |
//!
//! Use [`ChatNetworkError::is_transport_failure`] to tell a network outage from an API
//! rejection.

mod call;
pub use self::call::{CallCancelled, CallHandle, CancelToken, ChatCall};

mod result;
pub use self::result::ChatResult;

mod error;
pub use self::error::{ChatNetworkError, ErrorCause, UNKNOWN_CODE};

mod parser;
pub use self::parser::{ErrorParser, JsonErrorParser};

mod transport;
pub use self::transport::{RawResponse, ReqwestCall, TransportCall, TransportError};

mod mapper;
pub use self::mapper::CallMapper;

mod client;
pub use self::client::{
    ChatClient, ChatClientBuilder, ChatRequest, ClientError, Credentials, DEFAULT_HOST,
    SecureString,
};

pub mod channels;

pub mod retry;
