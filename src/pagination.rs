//! This module defines the common functionality for paging data.

/// The config that controls how list endpoints page their data.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of records per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 50,
        }
    }
}

/// Coerce a raw request parameter to a positive integer.
///
/// Non-numeric or non-positive input falls back to `default` rather than
/// erroring. Parsing as `i64` keeps accepted values inside SQLite's
/// integer range.
pub fn parse_positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|&value| value > 0)
        .map_or(default, |value| value as u64)
}

/// The number of pages needed to show `total` records at `limit` records
/// per page.
///
/// `limit` must be positive, which the query parsing guarantees.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit)
}
