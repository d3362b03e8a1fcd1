use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

/// A configured mock endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MockApi {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub method: HttpMethod,
    pub path: String,
    pub status_code: u16,
    #[serde(default)]
    pub response_headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub response_body: Option<serde_json::Value>,
    #[serde(default)]
    pub response_template: Option<String>,
    pub is_active: bool,
    pub version: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request payload for creating a mock. `status_code` and `is_active` fall
/// back to the server defaults (200, active) when unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MockApiCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl MockApiCreate {
    pub fn new(name: &str, method: HttpMethod, path: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            method,
            path: path.to_string(),
            status_code: None,
            response_headers: None,
            response_body: None,
            response_template: None,
            is_active: None,
            category_id: None,
        }
    }
}

/// Request payload for updating a mock. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MockApiUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// Filters for listing mocks. `category_id = Some(0)` selects mocks without
/// a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockApiQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub is_active: Option<bool>,
    pub method: Option<HttpMethod>,
    pub search: Option<String>,
    pub category_id: Option<i64>,
}

impl MockApiQuery {
    pub fn first_page(size: u32) -> Self {
        Self {
            page: Some(1),
            size: Some(size),
            search: Some(String::new()),
            ..Self::default()
        }
    }

    /// `self` with every field that is set in `overrides` replaced.
    pub fn merged(&self, overrides: &MockApiQuery) -> MockApiQuery {
        MockApiQuery {
            page: overrides.page.or(self.page),
            size: overrides.size.or(self.size),
            is_active: overrides.is_active.or(self.is_active),
            method: overrides.method.or(self.method),
            search: overrides.search.clone().or_else(|| self.search.clone()),
            category_id: overrides.category_id.or(self.category_id),
        }
    }
}

/// Body returned by invoking a mock endpoint directly.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl MockResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            MockResponseBody::Json(v) => Some(v),
            MockResponseBody::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_skips_unset_fields() {
        let input = MockApiCreate::new("Users", HttpMethod::Get, "/users");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["method"], "GET");
        assert!(json.get("status_code").is_none());
        assert!(json.get("is_active").is_none());
    }

    #[test]
    fn update_keeps_explicit_false() {
        let input = MockApiUpdate {
            is_active: Some(false),
            ..MockApiUpdate::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"is_active": false}));
    }

    #[test]
    fn mock_accepts_missing_optional_fields() {
        let mock: MockApi = serde_json::from_str(
            r#"{"id":3,"name":"Ping","method":"GET","path":"/ping","status_code":200,
                "is_active":true,"version":1,"created_at":"2024-01-01T00:00:00",
                "updated_at":"2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(mock.id, 3);
        assert!(mock.category_id.is_none());
        assert!(mock.response_body.is_none());
    }

    #[test]
    fn merged_prefers_overrides() {
        let base = MockApiQuery::first_page(20);
        let overrides = MockApiQuery {
            page: Some(3),
            method: Some(HttpMethod::Post),
            ..MockApiQuery::default()
        };
        let merged = base.merged(&overrides);
        assert_eq!(merged.page, Some(3));
        assert_eq!(merged.size, Some(20));
        assert_eq!(merged.method, Some(HttpMethod::Post));
        assert_eq!(merged.search.as_deref(), Some(""));
    }
}
