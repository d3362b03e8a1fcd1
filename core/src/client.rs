//! Stateless HTTP request builder and response parser for the Mocker API.
//!
//! # Design
//! `ApiClient` holds only the URL layout (base URL, API prefix, mock prefix)
//! and carries no mutable state between calls. It builds `HttpRequest` values
//! and parses `HttpResponse` values; executing the round-trip is the job of a
//! `Transport`. Every non-2xx response is normalised here into
//! `ApiError::Http`, pulling the server's `detail` or `message` field out of
//! the JSON body.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ClientConfig, DEFAULT_API_PREFIX, DEFAULT_MOCK_PREFIX};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::MockResponseBody;

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_prefix: String,
    mock_prefix: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_prefixes(base_url, DEFAULT_API_PREFIX, DEFAULT_MOCK_PREFIX)
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_prefixes(&config.base_url, &config.api_prefix, &config.mock_prefix)
    }

    fn with_prefixes(base_url: &str, api_prefix: &str, mock_prefix: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_prefix: normalize_prefix(api_prefix),
            mock_prefix: normalize_prefix(mock_prefix),
        }
    }

    /// Absolute URL of an API path such as `/mocks/?page=2`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, leading_slash(path))
    }

    /// Absolute URL of a path on the live mock surface, bypassing the API
    /// prefix.
    pub fn mock_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.mock_prefix, leading_slash(path))
    }

    /// A bodiless API request.
    pub fn build(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: self.api_url(path),
            headers: json_headers(),
            body: None,
        }
    }

    /// An API request carrying `body` as JSON.
    pub fn build_with_body<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let mut request = self.build(method, path);
        request.body = Some(to_json(body)?);
        Ok(request)
    }

    /// A request that invokes a mock as a client of the served endpoint
    /// would. The body is only attached for methods that carry one.
    pub fn build_mock_invocation(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpRequest, ApiError> {
        let body = match body {
            Some(value) if method.allows_body() => Some(to_json(value)?),
            _ => None,
        };
        Ok(HttpRequest {
            method,
            path: self.mock_url(path),
            headers: json_headers(),
            body,
        })
    }

    /// Check the status and deserialize the body. An empty body reads as
    /// JSON `null`, so `()` and `Option<T>` accept bodiless replies.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parse the reply of a direct mock invocation: JSON when the content
    /// type says so, raw text otherwise. An empty JSON body (204, HEAD)
    /// reads as `null`.
    pub fn parse_mock_invocation(&self, response: HttpResponse) -> Result<MockResponseBody, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: format!("HTTP {}", response.status),
                detail: None,
            });
        }
        if response.is_json() && response.body.trim().is_empty() {
            Ok(MockResponseBody::Json(serde_json::Value::Null))
        } else if response.is_json() {
            serde_json::from_str(&response.body)
                .map(MockResponseBody::Json)
                .map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            Ok(MockResponseBody::Text(response.body))
        }
    }
}

/// Map non-success status codes to `ApiError::Http`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        message: format!("Request failed with status code {}", response.status),
        detail: server_detail(&response.body),
    })
}

/// The `detail` field of a JSON error body, else its `message` field.
/// Structured details (validation error lists) are kept as JSON text.
fn server_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .filter_map(|key| value.get(key))
        .find(|v| !v.is_null())
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        leading_slash(trimmed).into_owned()
    }
}

fn leading_slash(path: &str) -> std::borrow::Cow<'_, str> {
    if path.starts_with('/') {
        path.into()
    } else {
        format!("/{path}").into()
    }
}
