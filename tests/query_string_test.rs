/// End-to-end tests from a raw query string, the way an HTTP adapter would call the crate
use filterkit::{
    FilterRequest, IntParam, QueryBuilder, QueryParams, Specification, compile, extract_params,
    extract_with_diagnostics,
};
use serde_json::json;
use url::form_urlencoded;

fn encode(pairs: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn params_from_query(query: &str) -> QueryParams {
    QueryParams::from_pairs(form_urlencoded::parse(query.as_bytes()))
}

#[test]
fn test_extract_then_compile() {
    let query = encode(&[
        ("filters", r#"{"status":"active"}"#),
        ("page", "2"),
        ("rows", "5"),
    ]);
    let options = compile(&extract_params(&params_from_query(&query)));

    assert_eq!(options.take, 5);
    assert_eq!(options.skip, 5);
    assert_eq!(
        serde_json::to_value(&options.where_clause).unwrap(),
        json!({"AND": [{"status": "active"}]})
    );
}

#[test]
fn test_full_query_string() {
    let query = encode(&[
        ("filters", r#"{"category":["books","music"],"author.country":"NZ"}"#),
        ("searchFilters", r#"{"title":"rust","summary":"rust"}"#),
        ("rangedFilters", r#"[{"key":"price","start":5,"end":50}]"#),
        ("orderKey", "price"),
        ("orderRule", "desc"),
        ("page", "3"),
        ("rows", "20"),
    ]);
    let options = compile(&extract_params(&params_from_query(&query)));

    assert_eq!(
        serde_json::to_value(&options).unwrap(),
        json!({
            "where": {"AND": [
                {"OR": [{"category": "books"}, {"category": "music"}]},
                {"author": {"country": "NZ"}},
                {"OR": [{"title": {"contains": "rust"}}, {"summary": {"contains": "rust"}}]},
                {"price": {"gte": 5, "lte": 50}}
            ]},
            "orderBy": {"price": "desc"},
            "take": 20,
            "skip": 40
        })
    );
}

/// Repeated keys resolve to their first value without error
#[test]
fn test_repeated_keys_use_first_value() {
    let params = params_from_query("page=2&page=7&rows=3&rows=99");
    let request = extract_params(&params);
    assert_eq!(request.page, Some(IntParam::Valid(2)));
    assert_eq!(request.rows, Some(IntParam::Valid(3)));
}

#[test]
fn test_malformed_parameter_does_not_fail_extraction() {
    let query = encode(&[
        ("filters", r#"{"status":"#),
        ("searchFilters", r#"{"title":"x"}"#),
        ("page", "1"),
    ]);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("filterkit=debug"))
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);
    let (request, diagnostics) = extract_with_diagnostics(&params_from_query(&query));

    assert!(request.filters.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].parameter, "filters");

    let options = compile(&request);
    assert_eq!(
        serde_json::to_value(&options.where_clause).unwrap(),
        json!({"AND": [{"title": {"contains": "x"}}]})
    );
}

/// A non-numeric page slips through extraction and compilation but fails validation
#[test]
fn test_non_numeric_page_is_caught_by_validation() {
    let request = extract_params(&params_from_query("page=abc&rows=5"));
    assert_eq!(request.page, Some(IntParam::Invalid(json!("abc"))));

    let builder = QueryBuilder::new().with_specification(Specification::new());
    let result = builder.build(&request);
    assert!(!result.validation.is_valid());
    assert_eq!((result.query.take, result.query.skip), (10, 0));
}

#[test]
fn test_query_params_deserialize_from_serde() {
    let params: QueryParams =
        serde_json::from_value(json!({"orderKey": "name", "orderRule": "asc", "page": "1"}))
            .unwrap();
    let request = extract_params(&params);
    assert_eq!(
        request,
        FilterRequest {
            order_key: Some("name".into()),
            order_rule: Some(filterkit::OrderRule::Asc),
            page: Some(IntParam::Valid(1)),
            ..FilterRequest::default()
        }
    );
}
