//! Channel and member operations of the chat API.
//!
//! Every operation returns a [`ChatCall`] without performing I/O. A request that cannot
//! even be prepared (e.g. a credential that is not a valid header value) yields a call that
//! fails immediately, so callers handle every failure through the [`ChatResult`](crate::ChatResult).

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::{ChatCall, ChatClient, ChatNetworkError, ClientError};

/// A chat channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id, unique within its type.
    pub id: String,
    /// Channel type, e.g. `messaging`.
    #[serde(rename = "type")]
    pub channel_type: String,
    /// Channel identifier, `{type}:{id}`.
    pub cid: String,
    /// Number of members.
    #[serde(default)]
    pub member_count: u32,
    /// Any other field returned by the API.
    #[serde(flatten)]
    pub extra_data: Map<String, Value>,
}

/// A member of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Id of the member user.
    pub user_id: String,
    /// Role of the member in the channel.
    #[serde(default)]
    pub role: Option<String>,
    /// Creation timestamp, as returned by the API.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Sort direction of a [`SortField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order.
    Ascending,
    /// Descending order.
    Descending,
}

/// A sort criterion of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    field: String,
    direction: i8,
}

impl SortField {
    /// Sorts by `field` in the given direction.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        let direction = match direction {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        };
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Sorts by `field`, ascending.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    /// Sorts by `field`, descending.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Query of the channels matching a filter.
///
/// ```rust
/// use chatcall_core::channels::{QueryChannelsRequest, SortField};
/// use serde_json::json;
///
/// let request = QueryChannelsRequest::new(json!({"members": {"$in": ["thierry"]}}), 0, 10)
///     .with_sort(SortField::desc("last_message_at"))
///     .watching();
/// assert!(request.watch);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryChannelsRequest {
    /// Filter conditions, in the API filter syntax.
    pub filter_conditions: Value,
    /// Sort criteria, applied in order.
    pub sort: Vec<SortField>,
    /// Number of channels to skip.
    pub offset: u32,
    /// Maximum number of channels returned.
    pub limit: u32,
    /// Also start watching the returned channels.
    pub watch: bool,
    /// Return the channel state.
    pub state: bool,
    /// Maximum number of messages returned per channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_limit: Option<u32>,
}

impl QueryChannelsRequest {
    /// Creates a query returning `limit` channels after `offset`.
    pub fn new(filter_conditions: Value, offset: u32, limit: u32) -> Self {
        Self {
            filter_conditions,
            sort: Vec::new(),
            offset,
            limit,
            watch: false,
            state: true,
            message_limit: None,
        }
    }

    /// Adds a sort criterion.
    #[must_use]
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Limits the number of messages returned per channel.
    #[must_use]
    pub fn with_message_limit(mut self, limit: u32) -> Self {
        self.message_limit = Some(limit);
        self
    }

    /// Starts watching the returned channels.
    #[must_use]
    pub fn watching(mut self) -> Self {
        self.watch = true;
        self
    }
}

/// Query of the members of a channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMembersRequest {
    /// Filter conditions, in the API filter syntax.
    pub filter_conditions: Value,
    /// Sort criteria, applied in order.
    pub sort: Vec<SortField>,
    /// Number of members to skip.
    pub offset: u32,
    /// Maximum number of members returned.
    pub limit: u32,
}

impl QueryMembersRequest {
    /// Creates a query returning `limit` members after `offset`.
    pub fn new(filter_conditions: Value, offset: u32, limit: u32) -> Self {
        Self {
            filter_conditions,
            sort: Vec::new(),
            offset,
            limit,
        }
    }

    /// Adds a sort criterion.
    #[must_use]
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    channels: Vec<ChannelStateResponse>,
}

#[derive(Debug, Deserialize)]
struct ChannelStateResponse {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct MembersResponse {
    members: Vec<Member>,
}

#[derive(Serialize)]
struct QueryMembersPayload<'a> {
    #[serde(rename = "type")]
    channel_type: &'a str,
    id: &'a str,
    #[serde(flatten)]
    query: &'a QueryMembersRequest,
}

impl ChatClient {
    /// Queries the channels matching `request`.
    pub fn query_channels(&self, request: &QueryChannelsRequest) -> ChatCall<Vec<Channel>> {
        let call = self
            .request_at(Method::POST, ["channels"])
            .and_then(|req| req.json(request))
            .map(|req| req.call::<ChannelsResponse>());

        resolved(call).map(|response| {
            response
                .channels
                .into_iter()
                .map(|state| state.channel)
                .collect()
        })
    }

    /// Queries the members of a channel.
    pub fn query_members(
        &self,
        channel_type: &str,
        channel_id: &str,
        request: &QueryMembersRequest,
    ) -> ChatCall<Vec<Member>> {
        let payload = QueryMembersPayload {
            channel_type,
            id: channel_id,
            query: request,
        };
        let call = serde_json::to_string(&payload)
            .map_err(ClientError::from)
            .and_then(|payload| {
                self.request_at(Method::GET, ["members"])?
                    .with_query(&[("payload", payload)])
            })
            .map(|req| req.call::<MembersResponse>());

        resolved(call).map(|response| response.members)
    }

    /// Creates a channel with the given members, or returns it if it already exists.
    pub fn create_channel(
        &self,
        channel_type: &str,
        channel_id: &str,
        members: &[&str],
    ) -> ChatCall<Channel> {
        let body = json!({
            "data": { "members": members },
            "state": true,
        });
        let call = self
            .request_at(Method::POST, ["channels", channel_type, channel_id, "query"])
            .and_then(|req| req.json(&body))
            .map(|req| req.call::<ChannelResponse>());

        resolved(call).map(|response| response.channel)
    }

    /// Adds members to a channel.
    pub fn add_members(
        &self,
        channel_type: &str,
        channel_id: &str,
        members: &[&str],
    ) -> ChatCall<Channel> {
        let body = json!({ "add_members": members });
        let call = self
            .request_at(Method::POST, ["channels", channel_type, channel_id])
            .and_then(|req| req.json(&body))
            .map(|req| req.call::<ChannelResponse>());

        resolved(call).map(|response| response.channel)
    }

    /// Deletes a channel.
    pub fn delete_channel(&self, channel_type: &str, channel_id: &str) -> ChatCall<Channel> {
        let call = self
            .request_at(Method::DELETE, ["channels", channel_type, channel_id])
            .map(|req| req.call::<ChannelResponse>());

        resolved(call).map(|response| response.channel)
    }
}

fn resolved<T>(call: Result<ChatCall<T>, ClientError>) -> ChatCall<T>
where
    T: Send + 'static,
{
    call.unwrap_or_else(|error| {
        warn!(%error, "fail to prepare request");
        ChatCall::failed(ChatNetworkError::from_exception(error))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_query_channels_request() {
        let request = QueryChannelsRequest::new(json!({"type": "messaging"}), 10, 10)
            .with_sort(SortField::desc("last_message_at"))
            .with_message_limit(5)
            .watching();

        insta::assert_snapshot!(serde_json::to_string_pretty(&request).expect("serializable"), @r#"
        {
          "filter_conditions": {
            "type": "messaging"
          },
          "sort": [
            {
              "field": "last_message_at",
              "direction": -1
            }
          ],
          "offset": 10,
          "limit": 10,
          "watch": true,
          "state": true,
          "message_limit": 5
        }
        "#);
    }

    #[test]
    fn should_flatten_members_payload() {
        let request = QueryMembersRequest::new(json!({"role": "admin"}), 0, 25)
            .with_sort(SortField::asc("created_at"));
        let payload = QueryMembersPayload {
            channel_type: "messaging",
            id: "general",
            query: &request,
        };

        insta::assert_snapshot!(serde_json::to_string(&payload).expect("serializable"), @r#"{"type":"messaging","id":"general","filter_conditions":{"role":"admin"},"sort":[{"field":"created_at","direction":1}],"offset":0,"limit":25}"#);
    }

    #[test]
    fn should_keep_unknown_channel_fields() {
        let channel: Channel = serde_json::from_value(json!({
            "id": "general",
            "type": "messaging",
            "cid": "messaging:general",
            "member_count": 2,
            "color": "green"
        }))
        .expect("valid channel");

        assert_eq!(channel.cid, "messaging:general");
        assert_eq!(channel.member_count, 2);
        assert_eq!(channel.extra_data.get("color"), Some(&json!("green")));
    }

    #[tokio::test]
    async fn should_fail_call_when_request_cannot_be_prepared() {
        let client = ChatClient::builder()
            .with_credentials(crate::Credentials::new("key").with_user_token("bad\ntoken"))
            .build()
            .expect("should build client");

        let result = client.delete_channel("messaging", "general").execute().await;

        let error = result.error();
        assert!(error.is_unknown_code());
        assert!(error.cause_as::<ClientError>().is_some());
    }
}
