//! Observable state container shared by the resource stores.
//!
//! # Design
//! A `StateCell` wraps a `tokio::sync::watch` sender: readers take snapshots
//! or subscribe for change notifications, writers mutate in place through
//! `update`. No lock is ever held across an `.await`.
//!
//! `begin` returns a `LoadingGuard` that raises `loading` and clears `error`;
//! dropping the guard lowers `loading` again once no other operation on the
//! same cell is still pending, so nested operations (a create that refetches)
//! keep the flag up until the outermost one finishes, and early returns or
//! `?` can never leave it stuck.

use tokio::sync::watch;

/// Loading flag and last error message of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub loading: bool,
    pub error: Option<String>,
    pending: usize,
}

/// State structs that carry a `RequestStatus`.
pub trait Tracked {
    fn status(&self) -> &RequestStatus;
    fn status_mut(&mut self) -> &mut RequestStatus;
}

#[derive(Debug)]
pub struct StateCell<S> {
    tx: watch::Sender<S>,
}

impl<S> StateCell<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn snapshot(&self) -> S
    where
        S: Clone,
    {
        self.tx.borrow().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Mutate the state in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }
}

impl<S: Tracked> StateCell<S> {
    pub fn begin(&self) -> LoadingGuard<'_, S> {
        self.update(|s| {
            let status = s.status_mut();
            status.pending += 1;
            status.loading = true;
            status.error = None;
        });
        LoadingGuard { cell: self }
    }

    pub fn fail(&self, message: String) {
        self.update(|s| s.status_mut().error = Some(message));
    }

    pub fn is_loading(&self) -> bool {
        self.read(|s| s.status().loading)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|s| s.status().error.clone())
    }
}

#[must_use = "loading is cleared when the guard is dropped"]
pub struct LoadingGuard<'a, S: Tracked> {
    cell: &'a StateCell<S>,
}

impl<S: Tracked> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.cell.update(|s| {
            let status = s.status_mut();
            status.pending = status.pending.saturating_sub(1);
            status.loading = status.pending > 0;
        });
    }
}
