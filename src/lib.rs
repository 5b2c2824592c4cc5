pub mod builder;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod transform;
pub mod validation;

pub use builder::{BuildResult, QueryBuilder};
pub use errors::{ParseDiagnostic, QueryError};
pub use filtering::{
    Condition, OrderBy, Predicate, QueryOptions, compile, extract, extract_params,
    extract_with_diagnostics,
};
pub use models::{FilterRequest, IntParam, OrderRule, ParamValue, QueryParams, RangedFilter};
pub use transform::{TransformConfig, transform_order, transform_where};
pub use validation::{Specification, ValidationResult, validate};
