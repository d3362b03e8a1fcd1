use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One served mock invocation, recorded by the server. Never mutated by the
/// client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestLog {
    pub id: i64,
    #[serde(default)]
    pub mock_api_id: Option<i64>,
    pub request_method: String,
    pub request_path: String,
    #[serde(default)]
    pub request_headers: Option<serde_json::Value>,
    #[serde(default)]
    pub request_body: Option<serde_json::Value>,
    #[serde(default)]
    pub request_params: Option<serde_json::Value>,
    #[serde(default)]
    pub response_status_code: Option<u16>,
    #[serde(default)]
    pub response_headers: Option<serde_json::Value>,
    #[serde(default)]
    pub response_body: Option<serde_json::Value>,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopApi {
    pub path: String,
    pub method: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogStats {
    pub total_requests: u64,
    pub today_requests: u64,
    /// Percentage of 2xx responses, 0..=100.
    pub success_rate: f64,
    pub avg_response_time: f64,
    pub top_apis: Vec<TopApi>,
    pub method_stats: HashMap<String, u64>,
    pub status_stats: HashMap<String, u64>,
}

/// Filters for listing logs. Dates are ISO-8601 strings passed through to the
/// server unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub mock_api_id: Option<i64>,
    pub method: Option<String>,
    pub status_code: Option<u16>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl LogQuery {
    pub fn first_page(size: u32) -> Self {
        Self {
            page: Some(1),
            size: Some(size),
            ..Self::default()
        }
    }

    /// `self` with every field that is set in `overrides` replaced.
    pub fn merged(&self, overrides: &LogQuery) -> LogQuery {
        LogQuery {
            page: overrides.page.or(self.page),
            size: overrides.size.or(self.size),
            mock_api_id: overrides.mock_api_id.or(self.mock_api_id),
            method: overrides.method.clone().or_else(|| self.method.clone()),
            status_code: overrides.status_code.or(self.status_code),
            start_date: overrides.start_date.clone().or_else(|| self.start_date.clone()),
            end_date: overrides.end_date.clone().or_else(|| self.end_date.clone()),
        }
    }
}
