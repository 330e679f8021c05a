#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use axum::{Json, Router};
use axum::extract::{Path, Query, Request};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tracing::debug;

use super::{API_KEY, USER_TOKEN};

pub const SLOW_DELAY: Duration = Duration::from_millis(500);

pub fn router() -> Router {
    let channels = Router::new()
        .route("/channels", post(query_channels))
        .route("/members", get(query_members))
        .route("/channels/{type}/{id}/query", post(create_channel))
        .route("/channels/{type}/{id}", post(add_members).delete(delete_channel))
        .layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/items", get(list_items))
        .route("/bad-filter", get(bad_filter))
        .route("/slow", get(slow))
        .route("/malformed", get(malformed))
        .route("/html-error", get(html_error))
        .merge(channels)
}

fn api_error(status: StatusCode, message: &str, code: i32) -> Response {
    let body = json!({
        "message": message,
        "code": code,
        "StatusCode": status.as_u16(),
    });
    (status, Json(body)).into_response()
}

async fn require_auth(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let api_key = params.get("api_key").map(String::as_str);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let auth_type = headers
        .get("stream-auth-type")
        .and_then(|value| value.to_str().ok());

    if api_key != Some(API_KEY) || authorization != Some(USER_TOKEN) || auth_type != Some("jwt") {
        debug!(?api_key, ?authorization, ?auth_type, "rejecting request");
        return api_error(StatusCode::UNAUTHORIZED, "invalid credentials", 5);
    }

    next.run(request).await
}

async fn list_items() -> Json<Value> {
    Json(json!({"items": [{"id": "a"}]}))
}

async fn bad_filter() -> Response {
    let body = json!({"message": "bad filter", "code": 17});
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({"items": []}))
}

async fn malformed() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"items": [{"id": 42}"#,
    )
        .into_response()
}

async fn html_error() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>Bad Gateway</body></html>",
    )
        .into_response()
}

fn channel(channel_type: &str, id: &str, member_count: usize) -> Value {
    json!({
        "id": id,
        "type": channel_type,
        "cid": format!("{channel_type}:{id}"),
        "member_count": member_count,
    })
}

async fn query_channels(Json(body): Json<Value>) -> Response {
    let Some(limit) = body.get("limit").and_then(Value::as_u64) else {
        return api_error(StatusCode::BAD_REQUEST, "limit is required", 4);
    };
    let channels = (0..limit.min(2))
        .map(|index| json!({"channel": channel("messaging", &format!("general-{index}"), 2)}))
        .collect::<Vec<_>>();

    Json(json!({"channels": channels})).into_response()
}

async fn query_members(Query(params): Query<HashMap<String, String>>) -> Response {
    let payload = params
        .get("payload")
        .and_then(|payload| serde_json::from_str::<Value>(payload).ok());
    let Some(payload) = payload else {
        return api_error(StatusCode::BAD_REQUEST, "payload is required", 4);
    };
    if payload.get("id").and_then(Value::as_str) == Some("missing") {
        return api_error(StatusCode::NOT_FOUND, "channel not found", 16);
    }

    Json(json!({
        "members": [
            {"user_id": "thierry", "role": "owner"},
            {"user_id": "tommaso", "role": "member"},
        ]
    }))
    .into_response()
}

async fn create_channel(
    Path((channel_type, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let members = body
        .pointer("/data/members")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    Json(json!({"channel": channel(&channel_type, &id, members)})).into_response()
}

async fn add_members(
    Path((channel_type, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Some(added) = body.get("add_members").and_then(Value::as_array) else {
        return api_error(StatusCode::BAD_REQUEST, "add_members is required", 4);
    };

    Json(json!({"channel": channel(&channel_type, &id, 1 + added.len())})).into_response()
}

async fn delete_channel(Path((channel_type, id)): Path<(String, String)>) -> Response {
    Json(json!({"channel": channel(&channel_type, &id, 0)})).into_response()
}
