//! Transient toast notifications.
//!
//! A `ToastStore` keeps the visible toasts in insertion order. Toasts with a
//! positive duration are removed by a timer task on the current tokio
//! runtime; a duration of 0 keeps the toast until `remove_toast` or
//! `clear_toasts`. Clones share the same list, and `ToastStore::global()`
//! is the process-wide instance, created empty on first use.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub const DEFAULT_DURATION_MS: u64 = 5000;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static GLOBAL: OnceLock<ToastStore> = OnceLock::new();

/// Process-unique toast identity, rendered as `toast-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    fn next() -> Self {
        ToastId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastItem {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    /// 0 means the toast stays until dismissed.
    pub duration_ms: u64,
}

/// A toast before it is given an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToast {
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    /// Defaults to `DEFAULT_DURATION_MS` when unset.
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ToastStore {
    toasts: Arc<watch::Sender<Vec<ToastItem>>>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self { toasts: Arc::new(tx) }
    }

    pub fn global() -> &'static ToastStore {
        GLOBAL.get_or_init(ToastStore::new)
    }

    /// Current toasts, oldest first.
    pub fn toasts(&self) -> Vec<ToastItem> {
        self.toasts.borrow().clone()
    }

    pub fn contains(&self, id: ToastId) -> bool {
        self.toasts.borrow().iter().any(|t| t.id == id)
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ToastItem>> {
        self.toasts.subscribe()
    }

    pub fn add_toast(&self, toast: NewToast) -> ToastId {
        let id = ToastId::next();
        let duration_ms = toast.duration_ms.unwrap_or(DEFAULT_DURATION_MS);
        self.toasts.send_modify(|list| {
            list.push(ToastItem {
                id,
                kind: toast.kind,
                title: toast.title,
                message: toast.message,
                duration_ms,
            })
        });
        if duration_ms > 0 {
            self.schedule_removal(id, Duration::from_millis(duration_ms));
        }
        id
    }

    fn schedule_removal(&self, id: ToastId, after: Duration) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(after).await;
                    store.remove_toast(id);
                });
            }
            Err(_) => tracing::warn!(%id, "no tokio runtime, toast will not auto-dismiss"),
        }
    }

    /// Remove a toast. Returns false when it was already gone.
    pub fn remove_toast(&self, id: ToastId) -> bool {
        self.toasts.send_if_modified(|list| {
            let before = list.len();
            list.retain(|t| t.id != id);
            list.len() != before
        })
    }

    pub fn clear_toasts(&self) {
        self.toasts.send_modify(Vec::clear);
    }

    pub fn success(&self, title: &str, message: Option<&str>, duration_ms: Option<u64>) -> ToastId {
        self.notify(ToastKind::Success, title, message, duration_ms)
    }

    /// Errors stay until dismissed unless `duration_ms` says otherwise.
    pub fn error(&self, title: &str, message: Option<&str>, duration_ms: Option<u64>) -> ToastId {
        self.notify(ToastKind::Error, title, message, Some(duration_ms.unwrap_or(0)))
    }

    pub fn warning(&self, title: &str, message: Option<&str>, duration_ms: Option<u64>) -> ToastId {
        self.notify(ToastKind::Warning, title, message, duration_ms)
    }

    pub fn info(&self, title: &str, message: Option<&str>, duration_ms: Option<u64>) -> ToastId {
        self.notify(ToastKind::Info, title, message, duration_ms)
    }

    fn notify(
        &self,
        kind: ToastKind,
        title: &str,
        message: Option<&str>,
        duration_ms: Option<u64>,
    ) -> ToastId {
        self.add_toast(NewToast {
            kind,
            title: title.to_string(),
            message: message.map(str::to_string),
            duration_ms,
        })
    }
}
