//! Resource API modules: one thin client per resource.
//!
//! Each function maps a domain operation to exactly one HTTP call and returns
//! the server's representation. Errors are never caught here; the stores
//! decide what a failure means for the user.

pub mod categories;
pub mod logs;
pub mod mocks;

pub use categories::CategoryClient;
pub use logs::LogClient;
pub use mocks::MockClient;
