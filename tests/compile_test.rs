use filterkit::{FilterRequest, IntParam, OrderRule, compile};
use serde_json::{Value, json};

fn where_json(request: &FilterRequest) -> Value {
    serde_json::to_value(compile(request).where_clause).unwrap()
}

#[test]
fn test_scalar_filter() {
    let request = FilterRequest::new().filter("status", "active");
    assert_eq!(where_json(&request), json!({"AND": [{"status": "active"}]}));
}

#[test]
fn test_array_filter_becomes_or() {
    let request = FilterRequest::new().filter("category", json!(["a", "b"]));
    assert_eq!(
        where_json(&request),
        json!({"AND": [{"OR": [{"category": "a"}, {"category": "b"}]}]})
    );
}

/// One AND entry per filter key, in insertion order; arrays of n produce n OR branches
#[test]
fn test_one_entry_per_filter_in_order() {
    let request = FilterRequest::new()
        .filter("zeta", 1)
        .filter("alpha", json!([1, 2, 3]))
        .filter("mid", true);
    let query = compile(&request);
    let entries = query.where_clause.and_entries();
    assert_eq!(entries.len(), 3);

    let value = serde_json::to_value(&query.where_clause).unwrap();
    assert_eq!(value["AND"][0], json!({"zeta": 1}));
    assert_eq!(value["AND"][1]["OR"].as_array().unwrap().len(), 3);
    assert_eq!(value["AND"][2], json!({"mid": true}));
}

#[test]
fn test_single_search_field_is_not_wrapped() {
    let request = FilterRequest::new().search("title", "x");
    assert_eq!(where_json(&request), json!({"AND": [{"title": {"contains": "x"}}]}));
}

#[test]
fn test_multiple_search_fields_share_one_or() {
    let request = FilterRequest::new().search("title", "x").search("desc", "y");
    assert_eq!(
        where_json(&request),
        json!({"AND": [{"OR": [{"title": {"contains": "x"}}, {"desc": {"contains": "y"}}]}]})
    );
}

#[test]
fn test_ranged_filter() {
    let request = FilterRequest::new().range("price", 10, 100);
    assert_eq!(where_json(&request), json!({"AND": [{"price": {"gte": 10, "lte": 100}}]}));
}

#[test]
fn test_ranges_keep_input_order_and_relations() {
    let request = FilterRequest::new()
        .range("publishedAt", "2024-01-01T00:00:00Z", "2024-12-31T00:00:00Z")
        .range("author.age", 30, 40);
    assert_eq!(
        where_json(&request),
        json!({"AND": [
            {"publishedAt": {"gte": "2024-01-01T00:00:00Z", "lte": "2024-12-31T00:00:00Z"}},
            {"author": {"age": {"gte": 30, "lte": 40}}}
        ]})
    );
}

/// Filters come first, then the search group, then ranges
#[test]
fn test_section_order() {
    let request = FilterRequest::new()
        .range("price", 1, 2)
        .search("title", "t")
        .filter("status", "s");
    assert_eq!(
        where_json(&request),
        json!({"AND": [
            {"status": "s"},
            {"title": {"contains": "t"}},
            {"price": {"gte": 1, "lte": 2}}
        ]})
    );
}

#[test]
fn test_empty_request() {
    let query = compile(&FilterRequest::new());
    assert_eq!(
        serde_json::to_value(&query).unwrap(),
        json!({"where": {"AND": []}, "orderBy": {}, "take": 10, "skip": 0})
    );
}

#[test]
fn test_relation_paths_split_mechanically() {
    let request = FilterRequest::new()
        .filter("author.name", "Ada")
        .filter("a.b.c", 1)
        .filter(".orphan", 2);
    assert_eq!(
        where_json(&request),
        json!({"AND": [
            {"author": {"name": "Ada"}},
            {"a": {"b.c": 1}},
            {"": {"orphan": 2}}
        ]})
    );
}

#[test]
fn test_null_values_are_skipped() {
    let request = FilterRequest::new()
        .filter("deleted", Value::Null)
        .search("title", Value::Null);
    assert_eq!(where_json(&request), json!({"AND": []}));
}

#[test]
fn test_order_by() {
    let query = compile(&FilterRequest::new().order("createdAt", Some(OrderRule::Desc)));
    assert_eq!(serde_json::to_value(&query.order_by).unwrap(), json!({"createdAt": "desc"}));

    let query = compile(&FilterRequest::new().order("createdAt", None));
    assert_eq!(serde_json::to_value(&query.order_by).unwrap(), json!({"createdAt": "asc"}));
}

// ============================================================================
// PAGINATION
// ============================================================================

#[test]
fn test_page_and_rows() {
    let query = compile(&FilterRequest::new().page(2).rows(25));
    assert_eq!((query.take, query.skip), (25, 25));
}

#[test]
fn test_first_page_without_rows() {
    let query = compile(&FilterRequest::new().page(1));
    assert_eq!((query.take, query.skip), (10, 0));
}

#[test]
fn test_page_without_rows_uses_fixed_size() {
    let query = compile(&FilterRequest::new().page(4));
    assert_eq!((query.take, query.skip), (10, 30));
}

/// `rows` has no effect unless a page is requested
#[test]
fn test_rows_without_page_is_ignored() {
    let query = compile(&FilterRequest::new().rows(50));
    assert_eq!((query.take, query.skip), (10, 0));
}

#[test]
fn test_unparseable_page_falls_back_to_defaults() {
    let mut request = FilterRequest::new().rows(5);
    request.page = Some(IntParam::parse("first"));
    let query = compile(&request);
    assert_eq!((query.take, query.skip), (10, 0));
}
