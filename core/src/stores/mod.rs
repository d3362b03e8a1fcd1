//! Resource state stores.
//!
//! Each store owns a `StateCell` for one resource and runs every operation
//! through the same protocol: raise `loading` and clear `error`, call the
//! resource client, then either write the result into state or record a
//! user-facing error message, and finally lower `loading` (the guard does
//! this on every path).
//!
//! Failures are reported in one of two ways. Plain list/detail fetches of
//! mocks and logs hand the `ApiError` back to the caller after recording it.
//! Everything else absorbs the error, raises an error toast and returns
//! `None`/`false`.

pub mod categories;
pub mod logs;
pub mod mocks;

pub use categories::{CategoryState, CategoryStore};
pub use logs::{LogState, LogStore};
pub use mocks::{MockState, MockStore};

use crate::error::ApiError;
use crate::state::{StateCell, Tracked};
use crate::toast::ToastStore;

/// Page size used by every list store.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Record `error` in `state` and return the message that was stored.
fn record<S: Tracked>(state: &StateCell<S>, error: &ApiError, fallback: &str) -> String {
    let message = error.user_message(fallback);
    tracing::warn!(error = %error, "{fallback}");
    state.fail(message.clone());
    message
}

/// Record `error` and raise a sticky error toast titled `fallback`.
fn report<S: Tracked>(state: &StateCell<S>, toasts: &ToastStore, error: &ApiError, fallback: &str) {
    let message = record(state, error, fallback);
    toasts.error(fallback, Some(&message), None);
}
