use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use utoipa::{IntoParams, ToSchema};

/// Raw query parameters for filtering, searching, sorting and paginating a list.
///
/// Every field is carried as the undecoded string that arrived on the wire. Use
/// [`crate::extract_params`] to turn this into a [`FilterRequest`].
///
/// # Filtering
/// `filters` is a JSON-encoded object of exact matches. Array values match any element:
/// ```json
/// {"status": "active", "category": ["books", "music"], "author.name": "Ada"}
/// ```
///
/// # Searching
/// `searchFilters` is a JSON-encoded object of substring matches:
/// ```json
/// {"title": "rust"}
/// ```
///
/// # Ranges
/// `rangedFilters` is a JSON-encoded array of inclusive bounds:
/// ```json
/// [{"key": "price", "start": 10, "end": 100}]
/// ```
///
/// # Sorting and pagination
/// `orderKey=createdAt&orderRule=desc&page=2&rows=25`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    /// JSON-encoded exact-match filters.
    #[param(example = r#"{"status":"active","category":["a","b"]}"#)]
    pub filters: Option<String>,
    /// JSON-encoded substring filters.
    #[param(example = r#"{"title":"rust"}"#)]
    pub search_filters: Option<String>,
    /// JSON-encoded array of `{key, start, end}` bounds.
    #[param(example = r#"[{"key":"price","start":10,"end":100}]"#)]
    pub ranged_filters: Option<String>,
    /// Field path to sort by.
    #[param(example = "createdAt")]
    pub order_key: Option<String>,
    /// Sort direction, `asc` or `desc`.
    #[param(example = "desc")]
    pub order_rule: Option<String>,
    /// 1-based page number.
    #[param(example = "1")]
    pub page: Option<String>,
    /// Page size.
    #[param(example = "10")]
    pub rows: Option<String>,
}

/// A parameter value as delivered by a query-string parser: either one value or
/// every value of a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// The value to use. Repeated keys resolve to their first occurrence.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.first().map(String::as_str),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl QueryParams {
    /// Build from a string-keyed map. Unrecognized keys are ignored.
    #[must_use]
    pub fn from_map<S: std::hash::BuildHasher>(params: &HashMap<String, ParamValue, S>) -> Self {
        let get = |name: &str| {
            params
                .get(name)
                .and_then(ParamValue::first)
                .map(ToString::to_string)
        };
        Self {
            filters: get("filters"),
            search_filters: get("searchFilters"),
            ranged_filters: get("rangedFilters"),
            order_key: get("orderKey"),
            order_rule: get("orderRule"),
            page: get("page"),
            rows: get("rows"),
        }
    }

    /// Build from decoded query-string pairs in wire order. The first occurrence of a
    /// repeated key wins; later occurrences are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "filters" => &mut params.filters,
                "searchFilters" => &mut params.search_filters,
                "rangedFilters" => &mut params.ranged_filters,
                "orderKey" => &mut params.order_key,
                "orderRule" => &mut params.order_rule,
                "page" => &mut params.page,
                "rows" => &mut params.rows,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}

/// One inclusive `[start, end]` bound on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedFilter {
    pub key: String,
    #[serde(default)]
    pub start: Value,
    #[serde(default)]
    pub end: Value,
}

impl RangedFilter {
    pub fn new(key: impl Into<String>, start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            start: start.into(),
            end: end.into(),
        }
    }
}

/// An integer parameter that may have failed to parse.
///
/// `Invalid` keeps the raw input so that validation can report it. The compiler treats
/// an invalid value as if the parameter were absent.
///
/// Deserializes from a JSON number or a numeric string alike, both read with
/// [`IntParam::parse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IntParam {
    Valid(i64),
    Invalid(Value),
}

impl IntParam {
    /// Parse a leading base-10 integer, ignoring surrounding whitespace and any trailing
    /// non-digit text (`"12abc"` is 12, `"2.5"` is 2). Input without leading digits is
    /// `Invalid`; digits beyond the range of `i64` saturate.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let digits_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return Self::Invalid(Value::String(raw.to_string()));
        }
        match unsigned[..digits_len].parse::<i64>() {
            Ok(number) if negative => Self::Valid(-number),
            Ok(number) => Self::Valid(number),
            Err(_) if negative => Self::Valid(i64::MIN),
            Err(_) => Self::Valid(i64::MAX),
        }
    }

    #[must_use]
    pub const fn value(&self) -> Option<i64> {
        match self {
            Self::Valid(number) => Some(*number),
            Self::Invalid(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for IntParam {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match &raw {
            Value::String(text) => Self::parse(text),
            Value::Number(number) => Self::parse(&number.to_string()),
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                Self::Invalid(raw)
            }
        })
    }
}

impl From<i64> for IntParam {
    fn from(value: i64) -> Self {
        Self::Valid(value)
    }
}

impl fmt::Display for IntParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(number) => write!(f, "{number}"),
            Self::Invalid(Value::String(raw)) => write!(f, "{raw}"),
            Self::Invalid(raw) => write!(f, "{raw}"),
        }
    }
}

/// Sort direction. Text other than `asc`/`desc` is kept verbatim and handed to the ORM
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderRule {
    #[default]
    Asc,
    Desc,
    Other(String),
}

impl OrderRule {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for OrderRule {
    fn from(raw: &str) -> Self {
        match raw {
            "asc" => Self::Asc,
            "desc" => Self::Desc,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OrderRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// A normalized filter request.
///
/// Field paths are either a bare column (`status`) or `relation.column`. Empty
/// collections and `None` mean the parameter was not supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRequest {
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub filters: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub search_filters: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ranged_filters: Vec<RangedFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_rule: Option<OrderRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<IntParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<IntParam>,
}

impl FilterRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn search(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.search_filters.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn range(
        mut self,
        field: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        self.ranged_filters.push(RangedFilter::new(field, start, end));
        self
    }

    #[must_use]
    pub fn order(mut self, key: impl Into<String>, rule: Option<OrderRule>) -> Self {
        self.order_key = Some(key.into());
        self.order_rule = rule;
        self
    }

    #[must_use]
    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(IntParam::Valid(page));
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: i64) -> Self {
        self.rows = Some(IntParam::Valid(rows));
        self
    }
}
