//! Shared repository result types
//!
//! The generic repository itself lives in the infrastructure layer; these are
//! the plain shapes it hands back.

use serde::Serialize;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// One page of records plus the numbers needed to render a pager.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    /// 1-based
    pub current_page: u64,
    pub last_page: u64,
}
