//! The live mock surface: `/mock/{*path}`.
//!
//! A request is answered by the active mock whose method and path match
//! exactly. Every call, matched or not, is recorded as a `RequestLog`.

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};

use crate::model::{MockApi, RequestLog};
use crate::{now, Db};

pub async fn serve(
    State(db): State<Db>,
    method: Method,
    Path(path): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let path = format!("/{path}");
    let request_body = read_body(&method, &headers, &body);

    let mut store = db.write().await;
    let matched = store
        .mocks
        .values()
        .find(|m| m.is_active && m.method == method.as_str() && m.path == path)
        .cloned();

    let (status, response_headers, response_body) = match &matched {
        Some(mock) => reply(mock),
        None => {
            tracing::debug!(%method, %path, "no mock matches");
            (
                StatusCode::NOT_FOUND,
                vec![("content-type".to_string(), "application/json".to_string())],
                json!({"error": "Mock API not found"}),
            )
        }
    };

    let id = store.next_log_id();
    store.logs.push(RequestLog {
        id,
        mock_api_id: matched.as_ref().map(|m| m.id),
        request_method: method.to_string(),
        request_path: path,
        request_headers: Some(headers_json(&headers)),
        request_body,
        request_params: Some(json!(params)),
        response_status_code: Some(status.as_u16()),
        response_headers: Some(json!(response_headers
            .iter()
            .cloned()
            .collect::<HashMap<String, String>>())),
        response_body: Some(response_body.clone()),
        response_time_ms: Some(started.elapsed().as_millis() as u64),
        client_ip: None,
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        created_at: now(),
    });
    drop(store);

    let json_reply = response_headers
        .iter()
        .any(|(n, v)| n == "content-type" && v.contains("json"));
    let payload = match response_body {
        Value::String(text) if !json_reply => text,
        other => other.to_string(),
    };
    let mut response = (status, payload).into_response();
    for (name, value) in response_headers {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(%name, "skipping invalid mock response header"),
        }
    }
    response
}

/// Status, headers and body a matched mock answers with. Configured headers
/// override the defaults.
fn reply(mock: &MockApi) -> (StatusCode, Vec<(String, String)>, Value) {
    let status = StatusCode::from_u16(mock.status_code).unwrap_or(StatusCode::OK);
    let mut headers = vec![
        ("content-type".to_string(), "application/json".to_string()),
        ("x-mock-response".to_string(), "true".to_string()),
    ];
    for (name, value) in mock.response_headers.iter().flatten() {
        let name = name.to_ascii_lowercase();
        headers.retain(|(n, _)| *n != name);
        headers.push((name, value.clone()));
    }
    let body = mock.response_body.clone().unwrap_or_else(|| {
        json!({
            "message": "Mock response",
            "timestamp": now(),
            "path": mock.path,
            "method": mock.method,
        })
    });
    (status, headers, body)
}

fn read_body(method: &Method, headers: &HeaderMap, body: &Bytes) -> Option<Value> {
    if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) || body.is_empty() {
        return None;
    }
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if is_json {
        serde_json::from_slice(body).ok()
    } else {
        Some(json!({"raw": String::from_utf8_lossy(body)}))
    }
}

fn headers_json(headers: &HeaderMap) -> Value {
    let map: HashMap<&str, &str> = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str(), v)))
        .collect();
    json!(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock(body: Option<Value>, headers: Option<HashMap<String, String>>) -> MockApi {
        MockApi {
            id: 1,
            name: "ping".to_string(),
            description: None,
            method: "GET".to_string(),
            path: "/ping".to_string(),
            status_code: 201,
            response_headers: headers,
            response_body: body,
            response_template: None,
            is_active: true,
            version: 1,
            category_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn configured_body_and_status_are_used() {
        let (status, _, body) = reply(&mock(Some(json!({"pong": true})), None));
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"pong": true}));
    }

    #[test]
    fn default_body_names_the_route() {
        let (_, _, body) = reply(&mock(None, None));
        assert_eq!(body["path"], "/ping");
        assert_eq!(body["method"], "GET");
    }

    #[test]
    fn configured_headers_override_defaults() {
        let custom = HashMap::from([("Content-Type".to_string(), "text/plain".to_string())]);
        let (_, headers, _) = reply(&mock(None, Some(custom)));
        let content_types: Vec<&str> = headers
            .iter()
            .filter(|(n, _)| n == "content-type")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(content_types, vec!["text/plain"]);
    }

    #[test]
    fn non_json_body_is_kept_raw() {
        let body = read_body(&Method::POST, &HeaderMap::new(), &Bytes::from_static(b"a=1"));
        assert_eq!(body, Some(json!({"raw": "a=1"})));
        assert!(read_body(&Method::GET, &HeaderMap::new(), &Bytes::from_static(b"x")).is_none());
    }
}
