use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::{record, report, DEFAULT_PAGE_SIZE};
use crate::api::MockClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::state::{RequestStatus, StateCell, Tracked};
use crate::toast::ToastStore;
use crate::transport::Transport;
use crate::types::{MockApi, MockApiCreate, MockApiQuery, MockApiUpdate, MockResponseBody, Page, Pagination};

#[derive(Debug, Clone, PartialEq)]
pub struct MockState {
    pub status: RequestStatus,
    /// The current page of mocks.
    pub mocks: Vec<MockApi>,
    pub current_mock: Option<MockApi>,
    pub pagination: Pagination,
    pub query: MockApiQuery,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            status: RequestStatus::default(),
            mocks: Vec::new(),
            current_mock: None,
            pagination: Pagination::with_size(DEFAULT_PAGE_SIZE),
            query: MockApiQuery::first_page(DEFAULT_PAGE_SIZE),
        }
    }
}

impl MockState {
    pub fn active_mocks(&self) -> Vec<&MockApi> {
        self.mocks.iter().filter(|m| m.is_active).collect()
    }

    pub fn inactive_mocks(&self) -> Vec<&MockApi> {
        self.mocks.iter().filter(|m| !m.is_active).collect()
    }

    /// Replace the entry with the same id, wherever it is held.
    fn patch(&mut self, mock: &MockApi) {
        if let Some(slot) = self.mocks.iter_mut().find(|m| m.id == mock.id) {
            *slot = mock.clone();
        }
        if self.current_mock.as_ref().is_some_and(|m| m.id == mock.id) {
            self.current_mock = Some(mock.clone());
        }
    }
}

impl Tracked for MockState {
    fn status(&self) -> &RequestStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

/// Mock endpoints: paginated list, current selection and CRUD.
///
/// Creating a mock refetches the current page; update and toggle patch the
/// affected entry in place; delete removes it locally.
pub struct MockStore<T> {
    api: MockClient<T>,
    toasts: ToastStore,
    state: StateCell<MockState>,
    list_seq: AtomicU64,
}

impl<T: Transport> MockStore<T> {
    pub fn new(api: MockClient<T>, toasts: ToastStore) -> Self {
        Self {
            api,
            toasts,
            state: StateCell::new(MockState::default()),
            list_seq: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &StateCell<MockState> {
        &self.state
    }

    pub fn snapshot(&self) -> MockState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<MockState> {
        self.state.subscribe()
    }

    pub fn active_mocks(&self) -> Vec<MockApi> {
        self.state.read(|s| s.active_mocks().into_iter().cloned().collect())
    }

    pub fn inactive_mocks(&self) -> Vec<MockApi> {
        self.state.read(|s| s.inactive_mocks().into_iter().cloned().collect())
    }

    /// Load the page described by the current query.
    pub async fn fetch_mocks(&self) -> Result<Page<MockApi>, ApiError> {
        self.fetch_mocks_with(&MockApiQuery::default()).await
    }

    /// Load a page using the current query with `overrides` applied. The
    /// stored query itself is left untouched.
    ///
    /// When several fetches overlap, only the most recently issued one
    /// writes its result into state.
    pub async fn fetch_mocks_with(&self, overrides: &MockApiQuery) -> Result<Page<MockApi>, ApiError> {
        let _loading = self.state.begin();
        let query = self.state.read(|s| s.query.merged(overrides));
        let seq = self.list_seq.fetch_add(1, Ordering::SeqCst) + 1;

        match self.api.list(&query).await {
            Ok(page) => {
                if self.list_seq.load(Ordering::SeqCst) == seq {
                    self.state.update(|s| {
                        s.mocks = page.items.clone();
                        s.pagination = Pagination::from(&page);
                    });
                } else {
                    tracing::debug!(seq, "discarding superseded mock list response");
                }
                Ok(page)
            }
            Err(e) => {
                if self.list_seq.load(Ordering::SeqCst) == seq {
                    record(&self.state, &e, "Failed to load mocks");
                } else {
                    tracing::debug!(seq, error = %e, "discarding superseded mock list failure");
                }
                Err(e)
            }
        }
    }

    pub async fn fetch_mock(&self, id: i64) -> Result<MockApi, ApiError> {
        let _loading = self.state.begin();
        match self.api.get(id).await {
            Ok(mock) => {
                self.state.update(|s| s.current_mock = Some(mock.clone()));
                Ok(mock)
            }
            Err(e) => {
                record(&self.state, &e, "Failed to load mock");
                Err(e)
            }
        }
    }

    pub async fn create_mock(&self, data: &MockApiCreate) -> Option<MockApi> {
        let _loading = self.state.begin();
        match self.api.create(data).await {
            Ok(mock) => {
                self.toasts.success("Mock created", Some(&mock.name), None);
                if let Err(e) = self.fetch_mocks().await {
                    tracing::debug!(error = %e, "mock list refresh after create failed");
                }
                Some(mock)
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to create mock");
                None
            }
        }
    }

    pub async fn update_mock(&self, id: i64, data: &MockApiUpdate) -> Option<MockApi> {
        let _loading = self.state.begin();
        match self.api.update(id, data).await {
            Ok(mock) => {
                self.state.update(|s| s.patch(&mock));
                self.toasts.success("Mock updated", Some(&mock.name), None);
                Some(mock)
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to update mock");
                None
            }
        }
    }

    pub async fn delete_mock(&self, id: i64) -> bool {
        let _loading = self.state.begin();
        match self.api.delete(id).await {
            Ok(_) => {
                self.state.update(|s| {
                    s.mocks.retain(|m| m.id != id);
                    s.pagination.total = s.pagination.total.saturating_sub(1);
                    if s.current_mock.as_ref().is_some_and(|m| m.id == id) {
                        s.current_mock = None;
                    }
                });
                self.toasts.success("Mock deleted", None, None);
                true
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to delete mock");
                false
            }
        }
    }

    /// Flip the active flag on the server and adopt the returned record.
    pub async fn toggle_mock(&self, id: i64) -> Option<MockApi> {
        let _loading = self.state.begin();
        match self.api.toggle(id).await {
            Ok(mock) => {
                self.state.update(|s| s.patch(&mock));
                let title = if mock.is_active { "Mock enabled" } else { "Mock disabled" };
                self.toasts.success(title, Some(&mock.name), None);
                Some(mock)
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to toggle mock");
                None
            }
        }
    }

    /// Invoke the served mock at `path` and return what it answered.
    pub async fn test_mock(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<&serde_json::Value>,
    ) -> Option<MockResponseBody> {
        let _loading = self.state.begin();
        match self.api.test(path, method, body).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Mock test failed");
                None
            }
        }
    }

    pub async fn search_mocks(&self, text: &str) -> Result<Page<MockApi>, ApiError> {
        self.state.update(|s| {
            s.query.search = Some(text.to_string());
            s.query.page = Some(1);
        });
        self.fetch_mocks().await
    }

    /// Adjust any filters in place, go back to page 1 and refetch.
    pub async fn filter_mocks(
        &self,
        filters: impl FnOnce(&mut MockApiQuery),
    ) -> Result<Page<MockApi>, ApiError> {
        self.state.update(|s| {
            filters(&mut s.query);
            s.query.page = Some(1);
        });
        self.fetch_mocks().await
    }

    pub async fn change_page(&self, page: u32) -> Result<Page<MockApi>, ApiError> {
        self.state.update(|s| s.query.page = Some(page));
        self.fetch_mocks().await
    }

    /// Restore the default filters. The category filter is kept.
    pub fn reset_query(&self) {
        self.state.update(|s| {
            s.query = MockApiQuery {
                category_id: s.query.category_id,
                ..MockApiQuery::first_page(DEFAULT_PAGE_SIZE)
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::client::ApiClient;
    use crate::rest::tests::ScriptedTransport;
    use crate::rest::RestClient;
    use crate::stores::fixtures;
    use crate::toast::ToastKind;

    fn store(transport: ScriptedTransport) -> (Arc<RestClient<ScriptedTransport>>, MockStore<ScriptedTransport>) {
        let rest = Arc::new(RestClient::new(ApiClient::new("http://api.test"), transport));
        let store = MockStore::new(MockClient::new(Arc::clone(&rest)), ToastStore::new());
        (rest, store)
    }

    #[tokio::test(start_paused = true)]
    async fn late_older_list_response_is_returned_but_not_stored() {
        let older = fixtures::page(vec![fixtures::mock(1, "old", true)], 1, 1, 20);
        let newer = fixtures::page(vec![fixtures::mock(2, "new", true)], 1, 1, 20);
        let (_, store) = store(
            ScriptedTransport::default()
                .reply_after(Duration::from_millis(100), 200, &older)
                .reply_after(Duration::from_millis(10), 200, &newer),
        );

        let (first, second) = tokio::join!(store.fetch_mocks(), store.search_mocks("new"));

        assert_eq!(first.unwrap().items[0].name, "old");
        assert_eq!(second.unwrap().items[0].name, "new");
        let state = store.snapshot();
        assert_eq!(state.mocks.len(), 1);
        assert_eq!(state.mocks[0].name, "new");
        assert!(!state.status.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn late_older_list_failure_leaves_newer_state() {
        let newer = fixtures::page(vec![fixtures::mock(2, "new", true)], 1, 1, 20);
        let (_, store) = store(
            ScriptedTransport::default()
                .fail_after(Duration::from_millis(100), ApiError::Transport("stale failure".to_string()))
                .reply_after(Duration::from_millis(10), 200, &newer),
        );

        let (first, second) = tokio::join!(store.fetch_mocks(), store.search_mocks("new"));

        assert!(matches!(first, Err(ApiError::Transport(_))));
        assert!(second.is_ok());
        let state = store.snapshot();
        assert_eq!(state.mocks[0].name, "new");
        assert_eq!(state.status.error, None);
    }

    #[tokio::test]
    async fn fetch_with_overrides_builds_query_and_fills_pagination() {
        let body = fixtures::page(vec![fixtures::mock(11, "a", true)], 15, 2, 10);
        let (rest, store) = store(ScriptedTransport::default().reply(200, &body));

        let overrides = MockApiQuery {
            page: Some(2),
            size: Some(10),
            method: Some(HttpMethod::Get),
            ..MockApiQuery::default()
        };
        store.fetch_mocks_with(&overrides).await.unwrap();

        assert_eq!(
            rest.transport().paths(),
            vec!["http://api.test/api/v1/mocks/?page=2&size=10&method=GET"]
        );
        let state = store.snapshot();
        assert_eq!(state.pagination, Pagination { total: 15, page: 2, size: 10, pages: 2 });
        assert_eq!(state.mocks.len(), 1);
        assert!(!state.status.loading);
        assert_eq!(state.query.page, Some(1));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_last_pagination_and_propagates() {
        let body = fixtures::page(vec![fixtures::mock(1, "a", true)], 1, 1, 20);
        let (_, store) = store(
            ScriptedTransport::default()
                .reply(200, &body)
                .reply(500, r#"{"detail":"database offline"}"#),
        );
        store.fetch_mocks().await.unwrap();
        let err = store.fetch_mocks().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        let state = store.snapshot();
        assert_eq!(state.status.error.as_deref(), Some("database offline"));
        assert_eq!(state.pagination.total, 1);
        assert_eq!(state.mocks.len(), 1);
        assert!(!state.status.loading);
    }

    #[tokio::test]
    async fn delete_removes_locally_and_clears_current() {
        let body = fixtures::page(
            vec![fixtures::mock(7, "seven", true), fixtures::mock(8, "eight", true)],
            2,
            1,
            20,
        );
        let (_, store) = store(
            ScriptedTransport::default()
                .reply(200, &body)
                .reply(200, &fixtures::mock(7, "seven", true).to_string())
                .reply(200, r#"{"message":"deleted"}"#),
        );
        store.fetch_mocks().await.unwrap();
        store.fetch_mock(7).await.unwrap();

        assert!(store.delete_mock(7).await);

        let state = store.snapshot();
        assert_eq!(state.mocks.iter().map(|m| m.id).collect::<Vec<_>>(), vec![8]);
        assert_eq!(state.pagination.total, 1);
        assert!(state.current_mock.is_none());
    }

    #[tokio::test]
    async fn delete_failure_returns_false_with_toast() {
        let (_, store) = store(ScriptedTransport::default().reply(404, r#"{"detail":"Mock not found"}"#));
        assert!(!store.delete_mock(3).await);
        let toasts = store.toasts.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].message.as_deref(), Some("Mock not found"));
        assert_eq!(store.snapshot().status.error.as_deref(), Some("Mock not found"));
    }

    #[tokio::test]
    async fn toggle_patches_entry_in_place() {
        let body = fixtures::page(vec![fixtures::mock(4, "four", true)], 1, 1, 20);
        let (_, store) = store(
            ScriptedTransport::default()
                .reply(200, &body)
                .reply(200, &fixtures::mock(4, "four", false).to_string()),
        );
        store.fetch_mocks().await.unwrap();
        let toggled = store.toggle_mock(4).await.unwrap();

        assert!(!toggled.is_active);
        assert!(store.active_mocks().is_empty());
        assert_eq!(store.inactive_mocks().len(), 1);
        assert_eq!(store.toasts.toasts()[0].title, "Mock disabled");
    }

    #[tokio::test]
    async fn create_refetches_current_page() {
        let created = fixtures::mock(9, "nine", true).to_string();
        let body = fixtures::page(vec![fixtures::mock(9, "nine", true)], 1, 1, 20);
        let (rest, store) = store(
            ScriptedTransport::default()
                .reply(200, &created)
                .reply(200, &body),
        );
        let mock = store
            .create_mock(&MockApiCreate::new("nine", HttpMethod::Get, "/nine"))
            .await
            .unwrap();

        assert_eq!(mock.id, 9);
        assert_eq!(rest.transport().paths().len(), 2);
        assert_eq!(store.snapshot().mocks.len(), 1);
        assert!(!store.state().is_loading());
    }

    #[tokio::test]
    async fn search_resets_page_and_sets_term() {
        let (rest, store) = store(
            ScriptedTransport::default()
                .reply(200, &fixtures::page(vec![], 0, 3, 20))
                .reply(200, &fixtures::page(vec![], 0, 1, 20)),
        );
        store.change_page(3).await.unwrap();
        store.search_mocks("user list").await.unwrap();

        let paths = rest.transport().paths();
        assert!(paths[0].ends_with("/mocks/?page=3&size=20"));
        assert!(paths[1].ends_with("/mocks/?page=1&size=20&search=user+list"));
    }

    #[tokio::test]
    async fn filter_merges_fields_and_resets_page() {
        let (rest, store) = store(ScriptedTransport::default().reply(200, &fixtures::page(vec![], 0, 1, 20)));
        store.state().update(|s| s.query.page = Some(5));
        store
            .filter_mocks(|q| {
                q.is_active = Some(false);
                q.category_id = Some(2);
            })
            .await
            .unwrap();
        assert!(rest.transport().paths()[0].ends_with("/mocks/?page=1&size=20&is_active=false&category_id=2"));
    }

    #[tokio::test]
    async fn reset_query_keeps_category_filter() {
        let (_, store) = store(ScriptedTransport::default());
        store.state().update(|s| {
            s.query.search = Some("x".to_string());
            s.query.method = Some(HttpMethod::Put);
            s.query.category_id = Some(3);
            s.query.size = Some(50);
        });
        store.reset_query();
        let query = store.snapshot().query;
        assert_eq!(query.search.as_deref(), Some(""));
        assert_eq!(query.method, None);
        assert_eq!(query.size, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(query.category_id, Some(3));
    }

    #[tokio::test]
    async fn test_mock_failure_is_absorbed() {
        let (_, store) = store(ScriptedTransport::default().fail(ApiError::Transport("connection refused".into())));
        let reply = store.test_mock("/ping", HttpMethod::Post, Some(&json!({"a": 1}))).await;
        assert!(reply.is_none());
        assert_eq!(store.snapshot().status.error.as_deref(), Some("connection refused"));
    }
}
