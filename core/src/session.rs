//! Wiring: one shared `RestClient` feeding the three resource stores.

use std::sync::Arc;

use crate::api::{CategoryClient, LogClient, MockClient};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::rest::RestClient;
use crate::stores::{CategoryStore, LogStore, MockStore};
use crate::toast::ToastStore;
use crate::transport::{Transport, UreqTransport};

/// Everything an admin frontend needs, built from one configuration.
///
/// All stores report to the same `ToastStore`.
pub struct Session<T> {
    pub rest: Arc<RestClient<T>>,
    pub toasts: ToastStore,
    pub mocks: MockStore<T>,
    pub categories: CategoryStore<T>,
    pub logs: LogStore<T>,
}

impl Session<UreqTransport> {
    /// Build a session talking to `config.base_url` over HTTP.
    pub fn connect(config: &ClientConfig) -> Self {
        tracing::info!(base_url = %config.base_url, timeout_ms = config.timeout.as_millis() as u64, "connecting");
        let rest = RestClient::new(ApiClient::from_config(config), UreqTransport::new(config.timeout));
        Self::with_rest(rest, ToastStore::global().clone())
    }
}

impl<T: Transport> Session<T> {
    pub fn with_rest(rest: RestClient<T>, toasts: ToastStore) -> Self {
        let rest = Arc::new(rest);
        Self {
            mocks: MockStore::new(MockClient::new(Arc::clone(&rest)), toasts.clone()),
            categories: CategoryStore::new(CategoryClient::new(Arc::clone(&rest)), toasts.clone()),
            logs: LogStore::new(LogClient::new(Arc::clone(&rest)), toasts.clone()),
            rest,
            toasts,
        }
    }
}
