use std::sync::Arc;

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::query::QueryString;
use crate::rest::RestClient;
use crate::transport::Transport;
use crate::types::{MessageResponse, MockApi, MockApiCreate, MockApiQuery, MockApiUpdate, MockResponseBody, Page};

/// Path and query of a mock list request. Parameters appear in a fixed
/// order and only when set.
pub fn list_path(query: &MockApiQuery) -> String {
    let mut qs = QueryString::new();
    qs.push_count("page", query.page)
        .push_count("size", query.size)
        .push_opt("is_active", query.is_active)
        .push_opt("method", query.method)
        .push_text("search", query.search.as_deref())
        .push_opt("category_id", query.category_id);
    qs.append_to("/mocks/")
}

pub struct MockClient<T> {
    rest: Arc<RestClient<T>>,
}

impl<T> Clone for MockClient<T> {
    fn clone(&self) -> Self {
        Self {
            rest: Arc::clone(&self.rest),
        }
    }
}

impl<T: Transport> MockClient<T> {
    pub fn new(rest: Arc<RestClient<T>>) -> Self {
        Self { rest }
    }

    pub async fn list(&self, query: &MockApiQuery) -> Result<Page<MockApi>, ApiError> {
        self.rest.get(&list_path(query)).await
    }

    pub async fn get(&self, id: i64) -> Result<MockApi, ApiError> {
        self.rest.get(&format!("/mocks/{id}")).await
    }

    pub async fn create(&self, data: &MockApiCreate) -> Result<MockApi, ApiError> {
        self.rest.post("/mocks/", data).await
    }

    pub async fn update(&self, id: i64, data: &MockApiUpdate) -> Result<MockApi, ApiError> {
        self.rest.put(&format!("/mocks/{id}"), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.rest.delete(&format!("/mocks/{id}")).await
    }

    /// Flip the active flag; returns the updated record.
    pub async fn toggle(&self, id: i64) -> Result<MockApi, ApiError> {
        self.rest.post_empty(&format!("/mocks/{id}/toggle")).await
    }

    /// Call the served mock at `path` directly, as its consumers would.
    pub async fn test(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<&serde_json::Value>,
    ) -> Result<MockResponseBody, ApiError> {
        let requests = self.rest.requests();
        let request = requests.build_mock_invocation(method, path, body)?;
        let response = self.rest.send(request).await?;
        requests.parse_mock_invocation(response)
    }
}
