use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::QueryError;
use crate::filtering::{Operator, RelationQuery};

/// Custom value logic for a field. Receives the raw value; `None` drops the field.
pub type ValueHandler = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Custom logic for a relation-mapped field. Receives the raw value (or the sort
/// direction) and the resolved column name. The result replaces the whole condition;
/// `None` drops it.
pub type RelationHandlerFn = Arc<dyn Fn(&Value, &str) -> Option<Value> + Send + Sync>;

/// Declared type of a field, driving value coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    /// Only meaningful with a custom handler; without one the default logic applies
    Custom,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeHandler {
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Operator wrapping the coerced value. Defaults to `equals`, or `contains` for strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(skip)]
    pub custom_handler: Option<ValueHandler>,
}

impl FieldTypeHandler {
    #[must_use]
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    #[must_use]
    pub fn with_custom_handler(
        mut self,
        handler: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.custom_handler = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for FieldTypeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeHandler")
            .field("field_type", &self.field_type)
            .field("operator", &self.operator)
            .field("custom_handler", &self.custom_handler.is_some())
            .finish()
    }
}

/// Whether a relation points at one record or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    One,
    Many,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationHandler {
    #[serde(rename = "type", default)]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_query: Option<RelationQuery>,
    /// Column to sort by on the related entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_field: Option<String>,
    #[serde(skip)]
    pub custom_handler: Option<RelationHandlerFn>,
}

impl RelationHandler {
    #[must_use]
    pub fn new(cardinality: Cardinality) -> Self {
        Self {
            cardinality,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_relation_query(mut self, query: RelationQuery) -> Self {
        self.relation_query = Some(query);
        self
    }

    #[must_use]
    pub fn with_nested_field(mut self, field: impl Into<String>) -> Self {
        self.nested_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_custom_handler(
        mut self,
        handler: impl Fn(&Value, &str) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.custom_handler = Some(Arc::new(handler));
        self
    }

    /// Quantifier for a nested condition. To-many relations need one, so they default
    /// to `some`; to-one relations only get one when configured.
    #[must_use]
    pub fn quantifier(&self) -> Option<RelationQuery> {
        match self.cardinality {
            Cardinality::Many => Some(self.relation_query.unwrap_or(RelationQuery::Some)),
            Cardinality::One => self.relation_query,
        }
    }
}

impl fmt::Debug for RelationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationHandler")
            .field("cardinality", &self.cardinality)
            .field("relation_query", &self.relation_query)
            .field("nested_field", &self.nested_field)
            .field("custom_handler", &self.custom_handler.is_some())
            .finish()
    }
}

/// Rewrites applied after compilation. Every map is keyed by the field path as it
/// appears in the compiled tree (`relation.column` inside a relation scope).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformConfig {
    /// Field path -> relation the field lives on
    pub field_mappings: HashMap<String, String>,
    /// Field path -> actual column name
    pub field_name_mappings: HashMap<String, String>,
    pub field_type_handlers: HashMap<String, FieldTypeHandler>,
    pub relation_handlers: HashMap<String, RelationHandler>,
}

impl TransformConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the declarative part of a configuration. Custom handlers cannot be
    /// expressed in JSON; attach them afterwards.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidConfig` if the JSON does not describe a configuration.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        serde_json::from_str(json)
            .map_err(|e| QueryError::invalid_config("Invalid transform configuration", e))
    }

    #[must_use]
    pub fn map_relation(mut self, field: impl Into<String>, relation: impl Into<String>) -> Self {
        self.field_mappings.insert(field.into(), relation.into());
        self
    }

    #[must_use]
    pub fn rename(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.field_name_mappings.insert(field.into(), column.into());
        self
    }

    #[must_use]
    pub fn type_handler(mut self, field: impl Into<String>, handler: FieldTypeHandler) -> Self {
        self.field_type_handlers.insert(field.into(), handler);
        self
    }

    #[must_use]
    pub fn relation_handler(mut self, field: impl Into<String>, handler: RelationHandler) -> Self {
        self.relation_handlers.insert(field.into(), handler);
        self
    }

    /// The column a field path is stored under, falling back to `default`.
    pub(crate) fn column_for<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.field_name_mappings
            .get(path)
            .map_or(default, String::as_str)
    }
}
