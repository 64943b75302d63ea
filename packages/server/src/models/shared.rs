use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination metadata included in list responses.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub page_size: u64,
    /// Total number of items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        Self {
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        }
    }
}

/// Page defaults to 1 (0 is treated as 1); page size defaults to 20 and is clamped to 1..=100.
pub fn normalize_paging(page: Option<u64>, page_size: Option<u64>) -> (u64, u64) {
    let page = Ord::max(page.unwrap_or(1), 1);
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}

/// Plain acknowledgement body.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "ok")]
    pub message: String,
}
