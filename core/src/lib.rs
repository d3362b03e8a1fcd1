//! Client core for the Mocker admin frontend.
//!
//! # Overview
//! Talks to a Mocker server (a service that serves configurable fake HTTP
//! endpoints) and keeps observable state for the three resources an admin
//! works with: mocks, categories and request logs.
//!
//! # Design
//! - `ApiClient` is stateless. It builds `HttpRequest` values and parses
//!   `HttpResponse` values; a `Transport` performs the round-trip
//!   (`UreqTransport` in production, in-memory fakes in tests).
//! - `RestClient` adds the request hook and error observation shared by
//!   every call. The `api` modules map one operation to one HTTP call.
//! - The `stores` hold resource state in `StateCell`s that UIs subscribe
//!   to, and raise toasts through a shared `ToastStore`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod rest;
pub mod session;
pub mod state;
pub mod stores;
pub mod toast;
pub mod transport;
pub mod tree;
pub mod types;

pub use api::{CategoryClient, LogClient, MockClient};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use rest::RestClient;
pub use session::Session;
pub use state::{RequestStatus, StateCell};
pub use stores::{CategoryStore, LogStore, MockStore};
pub use toast::{ToastItem, ToastKind, ToastStore};
pub use transport::{Transport, UreqTransport};
pub use tree::{find_category_by_id, flatten_categories};
