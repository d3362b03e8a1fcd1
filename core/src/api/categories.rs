use std::sync::Arc;

use crate::error::ApiError;
use crate::query::QueryString;
use crate::rest::RestClient;
use crate::transport::Transport;
use crate::tree;
use crate::types::{
    BatchUpdateCategoryRequest, Category, CategoryCreate, CategorySortRequest, CategoryStats,
    CategoryTree, CategoryUpdate, MessageResponse,
};

pub struct CategoryClient<T> {
    rest: Arc<RestClient<T>>,
}

impl<T> Clone for CategoryClient<T> {
    fn clone(&self) -> Self {
        Self {
            rest: Arc::clone(&self.rest),
        }
    }
}

impl<T: Transport> CategoryClient<T> {
    pub fn new(rest: Arc<RestClient<T>>) -> Self {
        Self { rest }
    }

    pub async fn list(&self, skip: Option<u32>, limit: Option<u32>) -> Result<Vec<Category>, ApiError> {
        let mut qs = QueryString::new();
        qs.push_opt("skip", skip).push_opt("limit", limit);
        self.rest.get(&qs.append_to("/categories")).await
    }

    /// The category tree, validated: malformed nodes are dropped.
    pub async fn tree(&self) -> Result<Vec<CategoryTree>, ApiError> {
        self.tree_raw().await.map(tree::sanitize_tree)
    }

    /// The tree payload exactly as the server sent it.
    pub async fn tree_raw(&self) -> Result<serde_json::Value, ApiError> {
        self.rest.get("/categories/tree").await
    }

    pub async fn stats(&self) -> Result<CategoryStats, ApiError> {
        self.rest.get("/categories/stats").await
    }

    pub async fn get(&self, id: i64) -> Result<Category, ApiError> {
        self.rest.get(&format!("/categories/{id}")).await
    }

    pub async fn create(&self, data: &CategoryCreate) -> Result<Category, ApiError> {
        self.rest.post("/categories/", data).await
    }

    pub async fn update(&self, id: i64, data: &CategoryUpdate) -> Result<Category, ApiError> {
        self.rest.put(&format!("/categories/{id}"), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.rest.delete(&format!("/categories/{id}")).await
    }

    pub async fn batch_update_mock_category(
        &self,
        request: &BatchUpdateCategoryRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.rest.put("/categories/batch-update-mocks", request).await
    }

    pub async fn update_category_sort(
        &self,
        request: &CategorySortRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.rest.put("/categories/sort", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::http::HttpMethod;
    use crate::rest::tests::ScriptedTransport;

    fn client(transport: ScriptedTransport) -> (Arc<RestClient<ScriptedTransport>>, CategoryClient<ScriptedTransport>) {
        let rest = Arc::new(RestClient::new(ApiClient::new("http://api.test"), transport));
        (Arc::clone(&rest), CategoryClient::new(rest))
    }

    #[tokio::test]
    async fn list_passes_skip_and_limit() {
        let (rest, categories) = client(ScriptedTransport::default().reply(200, "[]"));
        categories.list(Some(0), Some(50)).await.unwrap();
        assert_eq!(
            rest.transport().paths(),
            vec!["http://api.test/api/v1/categories?skip=0&limit=50"]
        );
    }

    #[tokio::test]
    async fn tree_drops_nodes_without_name() {
        let (_, categories) = client(
            ScriptedTransport::default().reply(200, r#"[{"id":1,"name":"A"},{"id":2,"name":null}]"#),
        );
        let tree = categories.tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "A");
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let (rest, categories) = client(ScriptedTransport::default().reply(204, ""));
        categories.delete(9).await.unwrap();
        let seen = rest.transport().requests.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Delete);
        assert_eq!(seen[0].path, "http://api.test/api/v1/categories/9");
    }

    #[tokio::test]
    async fn sort_puts_ordered_pairs() {
        let (rest, categories) =
            client(ScriptedTransport::default().reply(200, r#"{"message":"sorted"}"#));
        let reply = categories
            .update_category_sort(&CategorySortRequest::from_ids(&[4, 2]))
            .await
            .unwrap();
        assert_eq!(reply.message, "sorted");
        let seen = rest.transport().requests.lock().unwrap();
        let body: serde_json::Value = serde_json::from_str(seen[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"category_orders": [{"id": 4, "sort_order": 0}, {"id": 2, "sort_order": 1}]})
        );
    }
}
