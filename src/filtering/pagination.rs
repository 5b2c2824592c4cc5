use crate::models::IntParam;

/// Page size used when `rows` is not given, or when no page is requested at all.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// `take`/`skip` values for the ORM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub take: u64,
    pub skip: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            take: DEFAULT_PAGE_SIZE,
            skip: 0,
        }
    }
}

/// Resolve 1-based `page`/`rows` into `take`/`skip`.
///
/// - `page` and `rows`: `take = rows`, `skip = (page - 1) * rows`
/// - `page` only: `take = 10`, `skip = 10 * (page - 1)`
/// - no `page`: `take = 10`, `skip = 0`, whatever `rows` says
///
/// Values that failed to parse count as absent. Negative results clamp to zero.
#[must_use]
pub fn parse_pagination(page: Option<&IntParam>, rows: Option<&IntParam>) -> Pagination {
    let Some(page) = page.and_then(IntParam::value) else {
        return Pagination::default();
    };
    let offset_pages = non_negative(page.saturating_sub(1));
    let take = rows
        .and_then(IntParam::value)
        .map_or(DEFAULT_PAGE_SIZE, non_negative);

    Pagination {
        take,
        skip: offset_pages.saturating_mul(take),
    }
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
