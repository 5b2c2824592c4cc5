use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::joined::{FieldPath, parse_dot_notation};
use crate::models::{FilterRequest, RangedFilter};

/// Comparison operators understood by the downstream ORM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    Not,
    In,
    NotIn,
    Lt,
    Lte,
    Gt,
    Gte,
    Contains,
    StartsWith,
    EndsWith,
    Search,
}

impl Operator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Not => "not",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Search => "search",
        }
    }

    /// Operators whose value is the user's raw input rather than a derived bound.
    #[must_use]
    pub const fn wraps_raw_value(self) -> bool {
        matches!(
            self,
            Self::Equals | Self::Contains | Self::StartsWith | Self::EndsWith
        )
    }
}

/// How a condition on a related entity is quantified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationQuery {
    /// At least one related record matches (to-many)
    Some,
    /// All related records match (to-many)
    Every,
    /// No related record matches (to-many)
    None,
    /// The related record matches (to-one)
    Is,
    /// The related record does not match (to-one)
    IsNot,
}

impl RelationQuery {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Some => "some",
            Self::Every => "every",
            Self::None => "none",
            Self::Is => "is",
            Self::IsNot => "isNot",
        }
    }
}

/// The test applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Shorthand equality, serialized as the bare value
    Equals(Value),
    /// `{"contains": value}`
    Contains(Value),
    /// `{"gte": start, "lte": end}`
    Range { gte: Value, lte: Value },
    /// `{"<operator>": value}`
    Compare { operator: Operator, value: Value },
    /// Handler output, serialized verbatim
    Custom(Value),
}

impl Predicate {
    #[must_use]
    pub const fn compare(operator: Operator, value: Value) -> Self {
        Self::Compare { operator, value }
    }
}

/// A boolean condition tree in the ORM's `where` dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `{"AND": [...]}`
    And(Vec<Condition>),
    /// `{"OR": [...]}`
    Or(Vec<Condition>),
    /// `{"<field>": predicate}`
    Field { field: String, predicate: Predicate },
    /// `{"<relation>": condition}` or `{"<relation>": {"<quantifier>": condition}}`
    Relation {
        relation: String,
        quantifier: Option<RelationQuery>,
        condition: Box<Condition>,
    },
    /// Handler output, serialized verbatim
    Custom(Value),
    /// `{}`; matches every row
    MatchAll,
}

impl Condition {
    pub fn field(field: impl Into<String>, predicate: Predicate) -> Self {
        Self::Field {
            field: field.into(),
            predicate,
        }
    }

    pub fn relation(relation: impl Into<String>, condition: Self) -> Self {
        Self::Relation {
            relation: relation.into(),
            quantifier: None,
            condition: Box::new(condition),
        }
    }

    /// Build a predicate on a field path, nesting it under the relation when the path
    /// is dotted.
    #[must_use]
    pub fn scoped(path: &str, predicate: Predicate) -> Self {
        match parse_dot_notation(path) {
            FieldPath::Column(column) => Self::field(column, predicate),
            FieldPath::Related { relation, column } => {
                Self::relation(relation, Self::field(column, predicate))
            }
        }
    }

    /// Conditions inside the root `AND`, or an empty slice for any other root.
    #[must_use]
    pub fn and_entries(&self) -> &[Condition] {
        match self {
            Self::And(entries) => entries,
            _ => &[],
        }
    }
}

/// A single-entry JSON object.
struct Entry<'a, T: ?Sized>(&'a str, &'a T);

impl<T: Serialize + ?Sized> Serialize for Entry<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, self.1)?;
        map.end()
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Equals(value) | Self::Custom(value) => value.serialize(serializer),
            Self::Contains(value) => Entry("contains", value).serialize(serializer),
            Self::Range { gte, lte } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("gte", gte)?;
                map.serialize_entry("lte", lte)?;
                map.end()
            }
            Self::Compare { operator, value } => {
                Entry(operator.as_str(), value).serialize(serializer)
            }
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::And(entries) => Entry("AND", entries).serialize(serializer),
            Self::Or(entries) => Entry("OR", entries).serialize(serializer),
            Self::Field { field, predicate } => Entry(field, predicate).serialize(serializer),
            Self::Relation {
                relation,
                quantifier: None,
                condition,
            } => Entry(relation, condition.as_ref()).serialize(serializer),
            Self::Relation {
                relation,
                quantifier: Some(quantifier),
                condition,
            } => Entry(relation, &Entry(quantifier.as_str(), condition.as_ref()))
                .serialize(serializer),
            Self::Custom(value) => value.serialize(serializer),
            Self::MatchAll => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

/// One equality condition per filter, in insertion order. Array values become an `OR`
/// with one equality per element; `null` values are skipped.
#[must_use]
pub fn compile_filters(filters: &Map<String, Value>) -> Vec<Condition> {
    filters
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            Value::Array(options) => Condition::Or(
                options
                    .iter()
                    .map(|option| Condition::scoped(key, Predicate::Equals(option.clone())))
                    .collect(),
            ),
            _ => Condition::scoped(key, Predicate::Equals(value.clone())),
        })
        .collect()
}

/// Substring conditions. Several fields are OR-combined into one condition; a single
/// field stands alone. `null` values do not count as present.
#[must_use]
pub fn compile_search_filters(search_filters: &Map<String, Value>) -> Option<Condition> {
    let mut conditions: Vec<Condition> = search_filters
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| Condition::scoped(key, Predicate::Contains(value.clone())))
        .collect();

    match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(Condition::Or(conditions)),
    }
}

/// One inclusive `gte`/`lte` condition per range, in input order.
#[must_use]
pub fn compile_ranged_filters(ranged_filters: &[RangedFilter]) -> Vec<Condition> {
    ranged_filters
        .iter()
        .map(|range| {
            Condition::scoped(
                &range.key,
                Predicate::Range {
                    gte: range.start.clone(),
                    lte: range.end.clone(),
                },
            )
        })
        .collect()
}

/// Build the root `AND` for a request: filters, then search, then ranges.
#[must_use]
pub fn compile_where(request: &FilterRequest) -> Condition {
    let mut entries = compile_filters(&request.filters);
    entries.extend(compile_search_filters(&request.search_filters));
    entries.extend(compile_ranged_filters(&request.ranged_filters));
    Condition::And(entries)
}
