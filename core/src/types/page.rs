use serde::{Deserialize, Serialize};

/// Paginated list envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

/// Pagination counters kept in store state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

impl Pagination {
    pub fn with_size(size: u32) -> Self {
        Self {
            total: 0,
            page: 1,
            size,
            pages: 0,
        }
    }
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            total: page.total,
            page: page.page,
            size: page.size,
            pages: page.pages,
        }
    }
}

/// `{"message": ...}` body of delete, clear and bulk endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}
