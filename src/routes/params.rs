use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, values below 1 mean 1.
    pub page: Option<i64>,
    /// Page size, values below 1 mean 10.
    #[serde(alias = "per_page")]
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn raw(&self) -> (i64, i64) {
        (self.page.unwrap_or(1), self.limit.unwrap_or(0))
    }
}

/// `page < 1` becomes 1 and `limit < 1` becomes the default page size. Neither
/// is an error.
pub fn normalize_page(page: i64, limit: i64) -> (u64, u64) {
    let page = if page < 1 { 1 } else { page as u64 };
    let limit = if limit < 1 { DEFAULT_PAGE_SIZE } else { limit as u64 };
    (page, limit)
}

/// Row offset of a normalized page. `None` when it lies beyond anything
/// Postgres can address (`OFFSET` is a signed 64-bit value), which callers
/// answer with an empty page.
pub fn page_offset(page: u64, limit: u64) -> Option<u64> {
    page.saturating_sub(1)
        .checked_mul(limit)
        .filter(|offset| *offset <= i64::MAX as u64)
}
