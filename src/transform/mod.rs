//! # Field Transformation
//!
//! Rewrites a compiled `where`/`orderBy` to match the actual data model: client-facing
//! field names can be renamed ([`TransformConfig::rename`]), moved onto a relation
//! ([`TransformConfig::map_relation`]) and typed ([`FieldTypeHandler`]), so that
//!
//! ```rust,ignore
//! // client sends
//! GET /posts?filters={"authorName":"Ada","published":"true"}
//! // compiled
//! {"AND": [{"authorName": "Ada"}, {"published": "true"}]}
//! // transformed with authorName -> author.name and published: boolean
//! {"AND": [{"author": {"name": {"contains": "Ada"}}}, {"published": {"equals": true}}]}
//! ```
//!
//! Transformation never fails. Unmapped fields keep their names, values that cannot be
//! coerced drop their field.

pub mod coercion;
pub mod conditions;
pub mod config;
pub mod sort;

pub use coercion::{coerce_boolean, coerce_date, coerce_number};
pub use conditions::transform_where;
pub use config::{
    Cardinality, FieldType, FieldTypeHandler, RelationHandler, RelationHandlerFn,
    TransformConfig, ValueHandler,
};
pub use sort::transform_order;
