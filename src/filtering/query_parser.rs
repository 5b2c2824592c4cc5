use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::errors::ParseDiagnostic;
use crate::models::{FilterRequest, IntParam, OrderRule, ParamValue, QueryParams, RangedFilter};

/// Decode one JSON-encoded parameter. Failures are logged, recorded and skipped.
fn parse_json_param<T: DeserializeOwned>(
    name: &str,
    raw: Option<&str>,
    diagnostics: &mut Vec<ParseDiagnostic>,
) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(parameter = name, error = %e, "Invalid JSON in query parameter, ignoring it");
            diagnostics.push(ParseDiagnostic::new(name, e.to_string()));
            None
        }
    }
}

/// Decode each range on its own so that one malformed element does not discard the rest.
fn parse_ranges(ranges: Vec<Value>, diagnostics: &mut Vec<ParseDiagnostic>) -> Vec<RangedFilter> {
    ranges
        .into_iter()
        .enumerate()
        .filter_map(|(index, range)| match serde_json::from_value(range) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                let name = format!("rangedFilters[{index}]");
                tracing::warn!(parameter = %name, error = %e, "Invalid range in query parameter, ignoring it");
                diagnostics.push(ParseDiagnostic::new(name, e.to_string()));
                None
            }
        })
        .collect()
}

/// Turn raw parameters into a [`FilterRequest`], also returning a diagnostic for every
/// parameter that could not be decoded.
///
/// Only parameters present in the input are populated. `orderRule` is not checked, and
/// `page`/`rows` that are not numbers are kept as [`IntParam::Invalid`] for the validator.
#[must_use]
pub fn extract_with_diagnostics(params: &QueryParams) -> (FilterRequest, Vec<ParseDiagnostic>) {
    let mut diagnostics = Vec::new();

    let filters: Option<Map<String, Value>> =
        parse_json_param("filters", params.filters.as_deref(), &mut diagnostics);
    let search_filters: Option<Map<String, Value>> = parse_json_param(
        "searchFilters",
        params.search_filters.as_deref(),
        &mut diagnostics,
    );
    let ranged_filters: Option<Vec<Value>> = parse_json_param(
        "rangedFilters",
        params.ranged_filters.as_deref(),
        &mut diagnostics,
    );
    let ranged_filters = ranged_filters.map(|ranges| parse_ranges(ranges, &mut diagnostics));

    let request = FilterRequest {
        filters: filters.unwrap_or_default(),
        search_filters: search_filters.unwrap_or_default(),
        ranged_filters: ranged_filters.unwrap_or_default(),
        order_key: params.order_key.clone(),
        order_rule: params.order_rule.as_deref().map(OrderRule::from),
        page: params.page.as_deref().map(IntParam::parse),
        rows: params.rows.as_deref().map(IntParam::parse),
    };

    (request, diagnostics)
}

/// Turn raw parameters into a [`FilterRequest`]. Never fails; see
/// [`extract_with_diagnostics`] for the parameters that were skipped.
#[must_use]
pub fn extract_params(params: &QueryParams) -> FilterRequest {
    extract_with_diagnostics(params).0
}

/// Turn a string-keyed parameter map into a [`FilterRequest`]. Repeated keys use their
/// first value.
#[must_use]
pub fn extract<S: std::hash::BuildHasher>(params: &HashMap<String, ParamValue, S>) -> FilterRequest {
    extract_params(&QueryParams::from_map(params))
}
