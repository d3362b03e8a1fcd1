//! In-memory stand-in for the Mocker backend.
//!
//! Serves the admin API under `/api/v1` (mocks, categories, request logs) and
//! the live mock surface under `/mock`. State lives in one `Store` behind an
//! `RwLock` and is lost when the process exits.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub mod categories;
pub mod logs;
pub mod mocks;
pub mod model;
pub mod proxy;

pub use model::{Category, CategoryView, MockApi, RequestLog, Store};

pub type Db = Arc<RwLock<Store>>;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub fn app() -> Router {
    app_with(Store::default())
}

/// The full router over a pre-populated store.
pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/mocks", get(mocks::list).post(mocks::create))
        .route("/mocks/", get(mocks::list).post(mocks::create))
        .route("/mocks/{id}", get(mocks::get).put(mocks::update).delete(mocks::delete))
        .route("/mocks/{id}/toggle", post(mocks::toggle))
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/", get(categories::list).post(categories::create))
        .route("/categories/tree", get(categories::tree))
        .route("/categories/stats", get(categories::stats))
        .route("/categories/batch-update-mocks", put(categories::batch_update_mocks))
        .route("/categories/sort", put(categories::sort))
        .route(
            "/categories/{id}",
            get(categories::get).put(categories::update).delete(categories::delete),
        )
        .route("/logs", get(logs::list).delete(logs::clear))
        .route("/logs/", get(logs::list).delete(logs::clear))
        .route("/logs/stats/overview", get(logs::stats))
        .route("/logs/{id}", get(logs::get));

    Router::new()
        .nest("/api/v1", api)
        .route("/mock/{*path}", any(proxy::serve))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Error reply with a `{"detail": ...}` body.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub detail: String,
}

impl AppError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, detail = %self.detail, "request rejected");
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    /// Slice `all` into the 1-based page `page`. An empty result still
    /// reports one page.
    pub fn slice(all: Vec<T>, page: u32, size: u32) -> Self {
        let total = all.len() as u64;
        let pages = if total == 0 {
            1
        } else {
            total.div_ceil(u64::from(size)) as u32
        };
        let skip = (page as usize - 1).saturating_mul(size as usize);
        let items = all.into_iter().skip(skip).take(size as usize).collect();
        Self {
            items,
            total,
            page,
            size,
            pages,
        }
    }
}

/// Validate paging parameters: `page >= 1`, `1 <= size <= 100`.
pub fn paging(page: Option<u32>, size: Option<u32>) -> Result<(u32, u32), AppError> {
    let page = page.unwrap_or(1);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page == 0 {
        return Err(AppError::unprocessable("page must be at least 1"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(AppError::unprocessable(format!("size must be between 1 and {MAX_PAGE_SIZE}")));
    }
    Ok((page, size))
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Current time as an ISO-8601 string without offset.
pub fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
