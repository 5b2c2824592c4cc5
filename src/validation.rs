//! Validation Support
//!
//! Checks a [`FilterRequest`] against a declared [`Specification`]: which fields and
//! relations may be filtered or sorted on, and how large a page may be. Problems are
//! reported, never thrown. Errors must block the request; warnings are advisory.
//!
//! # Example
//!
//! ```rust,ignore
//! use filterkit::{FilterRequest, Specification, validate};
//!
//! let spec = Specification::new()
//!     .allow_fields(["status", "author.name"])
//!     .allow_relations(["author"])
//!     .max_page_size(100);
//!
//! let result = validate(&request, Some(&spec));
//! if !result.is_valid() {
//!     return Err(ApiError::validation_failed(result.errors().to_vec()));
//! }
//! ```

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::QueryError;
use crate::filtering::parse_dot_notation;
use crate::models::{FilterRequest, IntParam};

/// What a client may ask for. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Specification {
    /// Field paths that may be used. `None` allows every field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_fields: Option<Vec<String>>,
    /// Field paths that must never be used
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forbidden_fields: Vec<String>,
    /// Relations that dotted paths may traverse. `None` allows every relation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_relations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_page_size: Option<u64>,
}

impl Specification {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a specification from JSON.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidConfig` if the JSON does not describe a specification.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        serde_json::from_str(json).map_err(|e| QueryError::invalid_config("Invalid specification", e))
    }

    #[must_use]
    pub fn allow_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn forbid_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn allow_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_relations = Some(relations.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = Some(size);
        self
    }
}

/// Outcome of one validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A result with nothing to report.
    #[must_use]
    pub fn valid() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Convert to Result, keeping the warnings on success.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::ValidationFailed` carrying every error when the request is
    /// invalid.
    pub fn into_result(self) -> Result<Vec<String>, QueryError> {
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(QueryError::validation_failed(self.errors))
        }
    }
}

/// `YYYY-MM-DDTHH:mm:ss[.fff]Z`
fn iso_utc_pattern() -> &'static Regex {
    static ISO_UTC: OnceLock<Regex> = OnceLock::new();
    ISO_UTC.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{3})?Z$").expect("Invalid regex")
    })
}

/// Parse a range bound only when it is a strict ISO-8601 UTC string.
fn parse_iso_bound(value: &Value) -> Option<DateTime<FixedOffset>> {
    let text = value.as_str()?;
    if !iso_utc_pattern().is_match(text) {
        return None;
    }
    DateTime::parse_from_rfc3339(text).ok()
}

struct Checker<'a> {
    spec: &'a Specification,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Checker<'_> {
    fn check_field(&mut self, path: &str) {
        if self.spec.forbidden_fields.iter().any(|field| field == path) {
            self.errors.push(format!("Field '{path}' is forbidden"));
        } else if let Some(allowed) = &self.spec.allowed_fields {
            if !allowed.iter().any(|field| field == path) {
                self.warnings
                    .push(format!("Field '{path}' is not in the list of allowed fields"));
            }
        }

        if let (Some(relation), Some(allowed)) = (
            parse_dot_notation(path).relation(),
            &self.spec.allowed_relations,
        ) {
            if !allowed.iter().any(|allowed| allowed == relation) {
                self.errors.push(format!("Relation '{relation}' is not allowed"));
            }
        }
    }

    fn check_date_order(&mut self, key: &str, start: &Value, end: &Value) {
        if let (Some(start), Some(end)) = (parse_iso_bound(start), parse_iso_bound(end)) {
            if start > end {
                self.errors
                    .push(format!("Invalid range for '{key}': start date is after end date"));
            }
        }
    }

    fn check_page(&mut self, page: &IntParam) {
        match page {
            IntParam::Valid(page) if *page < 1 => {
                self.errors.push("Page must be greater than or equal to 1".to_string());
            }
            IntParam::Valid(_) => {}
            IntParam::Invalid(_) => {
                self.errors.push(format!("Page must be a valid integer, got '{page}'"));
            }
        }
    }

    fn check_rows(&mut self, rows: &IntParam) {
        match rows {
            IntParam::Valid(count) if *count < 1 => {
                self.errors.push("Rows must be greater than or equal to 1".to_string());
            }
            IntParam::Valid(count) => {
                if let Some(max) = self.spec.max_page_size {
                    if u64::try_from(*count).is_ok_and(|count| count > max) {
                        self.errors
                            .push(format!("Rows cannot exceed the maximum page size of {max}"));
                    }
                }
            }
            IntParam::Invalid(_) => {
                self.errors.push(format!("Rows must be a valid integer, got '{rows}'"));
            }
        }
    }
}

/// Check a request against a specification. Without one, every request is valid.
///
/// All checks run; a request can collect several errors and warnings at once.
#[must_use]
pub fn validate(request: &FilterRequest, spec: Option<&Specification>) -> ValidationResult {
    let Some(spec) = spec else {
        return ValidationResult::valid();
    };
    let mut checker = Checker {
        spec,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    for field in request.filters.keys() {
        checker.check_field(field);
    }
    for field in request.search_filters.keys() {
        checker.check_field(field);
    }
    for range in &request.ranged_filters {
        checker.check_field(&range.key);
        checker.check_date_order(&range.key, &range.start, &range.end);
    }
    if let Some(order_key) = &request.order_key {
        checker.check_field(order_key);
    }
    if let Some(page) = &request.page {
        checker.check_page(page);
    }
    if let Some(rows) = &request.rows {
        checker.check_rows(rows);
    }

    ValidationResult::new(checker.errors, checker.warnings)
}
