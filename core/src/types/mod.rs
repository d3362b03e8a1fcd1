//! Domain DTOs for the Mocker API.
//!
//! # Design
//! These types mirror the server's JSON schema but are defined independently
//! of the mock-server crate; integration tests catch schema drift. Fields the
//! server may omit are `Option` or `#[serde(default)]`, and optional fields on
//! write payloads are skipped when unset so the server applies its defaults.

pub mod category;
pub mod log;
pub mod mock;
pub mod page;

pub use category::{
    BatchUpdateCategoryRequest, Category, CategoryCreate, CategoryOrder, CategorySortRequest,
    CategoryStats, CategoryTree, CategoryUpdate, FlatCategory,
};
pub use log::{LogQuery, LogStats, RequestLog, TopApi};
pub use mock::{MockApi, MockApiCreate, MockApiQuery, MockApiUpdate, MockResponseBody};
pub use page::{MessageResponse, Page, Pagination};
