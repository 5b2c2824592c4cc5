//! # Filtering, Search, Sorting & Pagination
//!
//! Translates query parameters into ORM query options without writing any query by hand.
//!
//! ## Pipeline
//!
//! 1. **Extract** ([`extract_params`]): decode the JSON-encoded parameters into a
//!    [`FilterRequest`](crate::FilterRequest). Undecodable parameters are skipped.
//! 2. **Compile** ([`compile`]): build a [`Condition`] tree, an [`OrderBy`] and
//!    `take`/`skip`.
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Exact match, OR over array elements
//! GET /posts?filters={"status":"published","category":["news","blog"]}
//! // -> {"AND": [{"status": "published"}, {"OR": [{"category": "news"}, {"category": "blog"}]}]}
//!
//! // Relation-scoped field
//! GET /posts?filters={"author.name":"Ada"}
//! // -> {"AND": [{"author": {"name": "Ada"}}]}
//!
//! // Substring search over several fields
//! GET /posts?searchFilters={"title":"rust","body":"rust"}
//! // -> {"AND": [{"OR": [{"title": {"contains": "rust"}}, {"body": {"contains": "rust"}}]}]}
//!
//! // Inclusive ranges
//! GET /posts?rangedFilters=[{"key":"views","start":10,"end":100}]
//! // -> {"AND": [{"views": {"gte": 10, "lte": 100}}]}
//!
//! // Sorting and pagination
//! GET /posts?orderKey=createdAt&orderRule=desc&page=3&rows=20
//! // -> orderBy {"createdAt": "desc"}, take 20, skip 40
//! ```

pub mod conditions;
pub mod joined;
pub mod pagination;
pub mod query_parser;
pub mod sort;

use serde::Serialize;
use serde_json::Value;

use crate::models::FilterRequest;

pub use conditions::{
    Condition, Operator, Predicate, RelationQuery, compile_filters, compile_ranged_filters,
    compile_search_filters, compile_where,
};
pub use joined::{FieldPath, parse_dot_notation};
pub use pagination::{DEFAULT_PAGE_SIZE, Pagination, parse_pagination};
pub use query_parser::{extract, extract_params, extract_with_diagnostics};
pub use sort::{OrderBy, parse_sorting};

/// Options handed to the ORM's `findMany`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(rename = "where")]
    pub where_clause: Condition,
    pub order_by: OrderBy,
    pub take: u64,
    pub skip: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Value>,
}

/// Compile a request into query options. Pure and infallible: odd field paths are
/// split mechanically rather than rejected.
#[must_use]
pub fn compile(request: &FilterRequest) -> QueryOptions {
    let where_clause = compile_where(request);
    let order_by = parse_sorting(request);
    let Pagination { take, skip } =
        parse_pagination(request.page.as_ref(), request.rows.as_ref());

    tracing::trace!(
        conditions = where_clause.and_entries().len(),
        take,
        skip,
        "Compiled filter request"
    );

    QueryOptions {
        where_clause,
        order_by,
        take,
        skip,
        include: None,
        select: None,
    }
}
