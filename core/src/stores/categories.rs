use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use super::report;
use crate::api::CategoryClient;
use crate::state::{RequestStatus, StateCell, Tracked};
use crate::toast::ToastStore;
use crate::transport::Transport;
use crate::tree;
use crate::types::{
    BatchUpdateCategoryRequest, Category, CategoryCreate, CategorySortRequest, CategoryStats,
    CategoryTree, CategoryUpdate, FlatCategory,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryState {
    pub status: RequestStatus,
    pub categories: Vec<Category>,
    /// Always sanitized: every node has an id and a name.
    pub category_tree: Vec<CategoryTree>,
    pub stats: Option<CategoryStats>,
}

impl Tracked for CategoryState {
    fn status(&self) -> &RequestStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

/// Category list, tree and stats. Every mutation refetches the tree except
/// the batch reassignment of mocks, which does not change its shape.
pub struct CategoryStore<T> {
    api: CategoryClient<T>,
    toasts: ToastStore,
    state: StateCell<CategoryState>,
    tree_in_flight: AtomicBool,
}

/// Clears the in-flight flag when the tree fetch ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T: Transport> CategoryStore<T> {
    pub fn new(api: CategoryClient<T>, toasts: ToastStore) -> Self {
        Self {
            api,
            toasts,
            state: StateCell::new(CategoryState::default()),
            tree_in_flight: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> &StateCell<CategoryState> {
        &self.state
    }

    pub fn snapshot(&self) -> CategoryState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CategoryState> {
        self.state.subscribe()
    }

    /// The current tree listed in pre-order with depths.
    pub fn flattened_categories(&self) -> Vec<FlatCategory> {
        self.state.read(|s| tree::flatten_categories(&s.category_tree))
    }

    pub fn find_category_by_id(&self, id: i64) -> Option<CategoryTree> {
        self.state
            .read(|s| tree::find_category_by_id(&s.category_tree, id).cloned())
    }

    pub async fn fetch_categories(&self) {
        let _loading = self.state.begin();
        match self.api.list(None, None).await {
            Ok(categories) => self.state.update(|s| s.categories = categories),
            Err(e) => report(&self.state, &self.toasts, &e, "Failed to load categories"),
        }
    }

    /// Reload the tree. A call made while another tree fetch is still
    /// running returns immediately without touching state.
    pub async fn fetch_category_tree(&self) {
        if self
            .tree_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("category tree fetch already in flight");
            return;
        }
        let _in_flight = InFlight(&self.tree_in_flight);
        let _loading = self.state.begin();

        match self.api.tree().await {
            Ok(tree) => {
                tracing::debug!(nodes = tree::count_nodes(&tree), "category tree loaded");
                self.state.update(|s| s.category_tree = tree);
            }
            Err(e) => report(&self.state, &self.toasts, &e, "Failed to load category tree"),
        }
    }

    pub async fn fetch_category_stats(&self) {
        let _loading = self.state.begin();
        match self.api.stats().await {
            Ok(stats) => self.state.update(|s| s.stats = Some(stats)),
            Err(e) => report(&self.state, &self.toasts, &e, "Failed to load category stats"),
        }
    }

    pub async fn create_category(&self, data: &CategoryCreate) -> Option<Category> {
        let _loading = self.state.begin();
        match self.api.create(data).await {
            Ok(category) => {
                self.toasts.success("Category created", Some(&category.name), None);
                self.fetch_category_tree().await;
                Some(category)
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to create category");
                None
            }
        }
    }

    pub async fn update_category(&self, id: i64, data: &CategoryUpdate) -> Option<Category> {
        let _loading = self.state.begin();
        match self.api.update(id, data).await {
            Ok(category) => {
                self.state.update(|s| {
                    if let Some(slot) = s.categories.iter_mut().find(|c| c.id == id) {
                        *slot = category.clone();
                    }
                });
                self.toasts.success("Category updated", Some(&category.name), None);
                self.fetch_category_tree().await;
                Some(category)
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to update category");
                None
            }
        }
    }

    pub async fn delete_category(&self, id: i64) -> bool {
        let _loading = self.state.begin();
        match self.api.delete(id).await {
            Ok(()) => {
                self.state.update(|s| s.categories.retain(|c| c.id != id));
                self.toasts.success("Category deleted", None, None);
                self.fetch_category_tree().await;
                true
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to delete category");
                false
            }
        }
    }

    /// Move mocks into `category_id`, or out of any category when `None`.
    pub async fn batch_update_mock_category(&self, category_id: Option<i64>, mock_ids: &[i64]) -> bool {
        let _loading = self.state.begin();
        let request = BatchUpdateCategoryRequest {
            category_id,
            mock_ids: mock_ids.to_vec(),
        };
        match self.api.batch_update_mock_category(&request).await {
            Ok(reply) => {
                self.toasts.success("Mocks moved", Some(&reply.message), None);
                true
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to move mocks");
                false
            }
        }
    }

    /// Persist a new sibling order; `ids[i]` gets sort order `i`.
    pub async fn update_category_sort(&self, ids: &[i64]) -> bool {
        let _loading = self.state.begin();
        match self.api.update_category_sort(&CategorySortRequest::from_ids(ids)).await {
            Ok(_) => {
                self.toasts.success("Category order saved", None, None);
                self.fetch_category_tree().await;
                true
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to save category order");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::client::ApiClient;
    use crate::error::ApiError;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::rest::tests::ScriptedTransport;
    use crate::rest::RestClient;
    use crate::stores::fixtures;
    use crate::toast::ToastKind;

    fn store<T: Transport>(transport: T) -> (Arc<RestClient<T>>, CategoryStore<T>) {
        let rest = Arc::new(RestClient::new(ApiClient::new("http://api.test"), transport));
        let store = CategoryStore::new(CategoryClient::new(Arc::clone(&rest)), ToastStore::new());
        (rest, store)
    }

    fn tree_body() -> String {
        let mut root = fixtures::category(1, "Users");
        root["children"] = json!([fixtures::category(2, "Admin")]);
        json!([root]).to_string()
    }

    #[tokio::test]
    async fn create_then_tree_contains_new_category() {
        let (rest, store) = store(
            ScriptedTransport::default()
                .reply(200, &fixtures::category(2, "Admin").to_string())
                .reply(200, &tree_body()),
        );
        let created = store
            .create_category(&CategoryCreate::new("Admin").under(1))
            .await
            .unwrap();

        assert_eq!(created.id, 2);
        assert!(store.find_category_by_id(2).is_some());
        assert_eq!(
            rest.transport().paths(),
            vec![
                "http://api.test/api/v1/categories/",
                "http://api.test/api/v1/categories/tree",
            ]
        );
        assert!(!store.state().is_loading());
    }

    #[tokio::test]
    async fn malformed_tree_nodes_are_filtered_without_error() {
        let body = json!([
            fixtures::category(1, "Kept"),
            {"id": 2, "name": null},
            {"name": "no id"}
        ])
        .to_string();
        let (_, store) = store(ScriptedTransport::default().reply(200, &body));
        store.fetch_category_tree().await;

        let state = store.snapshot();
        assert_eq!(state.category_tree.len(), 1);
        assert_eq!(state.category_tree[0].name, "Kept");
        assert!(state.status.error.is_none());
    }

    #[tokio::test]
    async fn failed_tree_fetch_keeps_last_tree_and_toasts() {
        let (_, store) = store(
            ScriptedTransport::default()
                .reply(200, &tree_body())
                .reply(500, r#"{"detail":"boom"}"#),
        );
        store.fetch_category_tree().await;
        assert_eq!(store.flattened_categories().len(), 2);

        store.fetch_category_tree().await;
        let state = store.snapshot();
        assert_eq!(tree::count_nodes(&state.category_tree), 2);
        assert_eq!(state.status.error.as_deref(), Some("boom"));
        let toasts = store.toasts.toasts();
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].title, "Failed to load category tree");
    }

    /// Answers every request with the same tree after a delay.
    #[derive(Default)]
    struct SlowTransport {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl Transport for SlowTransport {
        fn execute(
            &self,
            _request: HttpRequest,
        ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: json!([fixtures::category(1, "Users")]).to_string(),
                })
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_tree_fetches_issue_one_request() {
        let (rest, store) = store(SlowTransport::default());
        tokio::join!(store.fetch_category_tree(), store.fetch_category_tree());

        assert_eq!(rest.transport().calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot().category_tree.len(), 1);

        store.fetch_category_tree().await;
        assert_eq!(rest.transport().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn batch_update_sends_null_and_skips_tree() {
        let (rest, store) = store(ScriptedTransport::default().reply(200, r#"{"message":"2 mocks updated"}"#));
        assert!(store.batch_update_mock_category(None, &[3, 4]).await);

        let seen = rest.transport().requests.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let body: serde_json::Value = serde_json::from_str(seen[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"category_id": null, "mock_ids": [3, 4]}));
    }

    #[tokio::test]
    async fn delete_failure_keeps_list() {
        let (_, store) = store(
            ScriptedTransport::default()
                .reply(200, &json!([fixtures::category(1, "Users")]).to_string())
                .reply(400, r#"{"detail":"Category has children"}"#),
        );
        store.fetch_categories().await;
        assert!(!store.delete_category(1).await);
        let state = store.snapshot();
        assert_eq!(state.categories.len(), 1);
        assert_eq!(state.status.error.as_deref(), Some("Category has children"));
    }

    #[tokio::test]
    async fn sort_refetches_tree() {
        let (rest, store) = store(
            ScriptedTransport::default()
                .reply(200, r#"{"message":"ok"}"#)
                .reply(200, &tree_body()),
        );
        assert!(store.update_category_sort(&[2, 1]).await);
        assert_eq!(rest.transport().paths().len(), 2);
        let levels: Vec<usize> = store.flattened_categories().iter().map(|f| f.level).collect();
        assert_eq!(levels, vec![0, 1]);
    }

    #[tokio::test]
    async fn stats_are_stored() {
        let (_, store) = store(ScriptedTransport::default().reply(
            200,
            r#"{"total_categories":3,"total_apis":9,"active_categories":2,"inactive_categories":1}"#,
        ));
        store.fetch_category_stats().await;
        assert_eq!(store.snapshot().stats.unwrap().total_apis, 9);
    }
}
