use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::{record, report, DEFAULT_PAGE_SIZE};
use crate::api::LogClient;
use crate::error::ApiError;
use crate::state::{RequestStatus, StateCell, Tracked};
use crate::toast::ToastStore;
use crate::transport::Transport;
use crate::types::{LogQuery, LogStats, Page, Pagination, RequestLog};

#[derive(Debug, Clone, PartialEq)]
pub struct LogState {
    pub status: RequestStatus,
    pub logs: Vec<RequestLog>,
    pub current_log: Option<RequestLog>,
    pub stats: Option<LogStats>,
    pub pagination: Pagination,
    pub query: LogQuery,
}

impl Default for LogState {
    fn default() -> Self {
        Self {
            status: RequestStatus::default(),
            logs: Vec::new(),
            current_log: None,
            stats: None,
            pagination: Pagination::with_size(DEFAULT_PAGE_SIZE),
            query: LogQuery::first_page(DEFAULT_PAGE_SIZE),
        }
    }
}

impl Tracked for LogState {
    fn status(&self) -> &RequestStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

pub struct LogStore<T> {
    api: LogClient<T>,
    toasts: ToastStore,
    state: StateCell<LogState>,
    list_seq: AtomicU64,
}

impl<T: Transport> LogStore<T> {
    pub fn new(api: LogClient<T>, toasts: ToastStore) -> Self {
        Self {
            api,
            toasts,
            state: StateCell::new(LogState::default()),
            list_seq: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &StateCell<LogState> {
        &self.state
    }

    pub fn snapshot(&self) -> LogState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LogState> {
        self.state.subscribe()
    }

    pub async fn fetch_logs(&self) -> Result<Page<RequestLog>, ApiError> {
        self.fetch_logs_with(&LogQuery::default()).await
    }

    /// Like `MockStore::fetch_mocks_with`: overrides apply to this request
    /// only, and a superseded response is not written to state.
    pub async fn fetch_logs_with(&self, overrides: &LogQuery) -> Result<Page<RequestLog>, ApiError> {
        let _loading = self.state.begin();
        let query = self.state.read(|s| s.query.merged(overrides));
        let seq = self.list_seq.fetch_add(1, Ordering::SeqCst) + 1;

        match self.api.list(&query).await {
            Ok(page) => {
                if self.list_seq.load(Ordering::SeqCst) == seq {
                    self.state.update(|s| {
                        s.logs = page.items.clone();
                        s.pagination = Pagination::from(&page);
                    });
                }
                Ok(page)
            }
            Err(e) => {
                if self.list_seq.load(Ordering::SeqCst) == seq {
                    record(&self.state, &e, "Failed to load logs");
                }
                Err(e)
            }
        }
    }

    pub async fn fetch_log(&self, id: i64) -> Result<RequestLog, ApiError> {
        let _loading = self.state.begin();
        match self.api.get(id).await {
            Ok(log) => {
                self.state.update(|s| s.current_log = Some(log.clone()));
                Ok(log)
            }
            Err(e) => {
                record(&self.state, &e, "Failed to load log");
                Err(e)
            }
        }
    }

    pub async fn fetch_stats(&self) -> Option<LogStats> {
        let _loading = self.state.begin();
        match self.api.stats().await {
            Ok(stats) => {
                self.state.update(|s| s.stats = Some(stats.clone()));
                Some(stats)
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to load log stats");
                None
            }
        }
    }

    /// Delete every log on the server, empty the local page and refresh the
    /// stats.
    pub async fn clear_logs(&self) -> bool {
        let _loading = self.state.begin();
        match self.api.clear().await {
            Ok(reply) => {
                self.state.update(|s| {
                    s.logs.clear();
                    s.current_log = None;
                    s.pagination.total = 0;
                    s.pagination.page = 1;
                    s.pagination.pages = 0;
                });
                self.toasts.success("Logs cleared", Some(&reply.message), None);
                self.fetch_stats().await;
                true
            }
            Err(e) => {
                report(&self.state, &self.toasts, &e, "Failed to clear logs");
                false
            }
        }
    }

    pub async fn filter_logs(
        &self,
        filters: impl FnOnce(&mut LogQuery),
    ) -> Result<Page<RequestLog>, ApiError> {
        self.state.update(|s| {
            filters(&mut s.query);
            s.query.page = Some(1);
        });
        self.fetch_logs().await
    }

    pub async fn change_page(&self, page: u32) -> Result<Page<RequestLog>, ApiError> {
        self.state.update(|s| s.query.page = Some(page));
        self.fetch_logs().await
    }

    pub fn reset_query(&self) {
        self.state.update(|s| s.query = LogQuery::first_page(DEFAULT_PAGE_SIZE));
    }
}
