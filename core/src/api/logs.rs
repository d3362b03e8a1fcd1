use std::sync::Arc;

use crate::error::ApiError;
use crate::query::QueryString;
use crate::rest::RestClient;
use crate::transport::Transport;
use crate::types::{LogQuery, LogStats, MessageResponse, Page, RequestLog};

/// Path and query of a log list request.
pub fn list_path(query: &LogQuery) -> String {
    let mut qs = QueryString::new();
    qs.push_count("page", query.page)
        .push_count("size", query.size)
        .push_opt("mock_api_id", query.mock_api_id)
        .push_text("method", query.method.as_deref())
        .push_opt("status_code", query.status_code)
        .push_text("start_date", query.start_date.as_deref())
        .push_text("end_date", query.end_date.as_deref());
    qs.append_to("/logs/")
}

pub struct LogClient<T> {
    rest: Arc<RestClient<T>>,
}

impl<T> Clone for LogClient<T> {
    fn clone(&self) -> Self {
        Self {
            rest: Arc::clone(&self.rest),
        }
    }
}

impl<T: Transport> LogClient<T> {
    pub fn new(rest: Arc<RestClient<T>>) -> Self {
        Self { rest }
    }

    pub async fn list(&self, query: &LogQuery) -> Result<Page<RequestLog>, ApiError> {
        self.rest.get(&list_path(query)).await
    }

    pub async fn get(&self, id: i64) -> Result<RequestLog, ApiError> {
        self.rest.get(&format!("/logs/{id}")).await
    }

    pub async fn stats(&self) -> Result<LogStats, ApiError> {
        self.rest.get("/logs/stats/overview").await
    }

    /// Delete every log on the server.
    pub async fn clear(&self) -> Result<MessageResponse, ApiError> {
        self.rest.delete("/logs/").await
    }
}
