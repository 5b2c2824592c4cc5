use serde::Serialize;
use serde_json::Value;

use crate::errors::QueryError;
use crate::filtering::{QueryOptions, compile};
use crate::models::FilterRequest;
use crate::transform::{TransformConfig, transform_order, transform_where};
use crate::validation::{Specification, ValidationResult, validate};

/// Query options together with the validation that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildResult {
    pub query: QueryOptions,
    pub validation: ValidationResult,
}

/// Validates, compiles and transforms filter requests with a fixed configuration.
///
/// The configuration is plain data: share a builder behind your own lock, or build one
/// per request. Every setter replaces the previous value entirely.
///
/// ```rust,ignore
/// let builder = QueryBuilder::new()
///     .with_specification(Specification::new().max_page_size(100))
///     .with_transform_config(TransformConfig::new().map_relation("authorName", "author"));
///
/// let BuildResult { query, validation } = builder.build(&extract_params(&params));
/// if !validation.is_valid() {
///     return Err(ApiError::validation_failed(validation.errors().to_vec()));
/// }
/// let posts = prisma_find_many("post", serde_json::to_value(&query)?);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    specification: Option<Specification>,
    transform_config: Option<TransformConfig>,
    include: Option<Value>,
    select: Option<Value>,
}

impl QueryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_specification(mut self, specification: Specification) -> Self {
        self.specification = Some(specification);
        self
    }

    #[must_use]
    pub fn with_transform_config(mut self, config: TransformConfig) -> Self {
        self.transform_config = Some(config);
        self
    }

    /// Relations to load alongside each row, passed through untouched.
    #[must_use]
    pub fn with_include(mut self, include: Value) -> Self {
        self.include = Some(include);
        self
    }

    /// Columns to return, passed through untouched.
    #[must_use]
    pub fn with_select(mut self, select: Value) -> Self {
        self.select = Some(select);
        self
    }

    pub fn set_specification(&mut self, specification: Option<Specification>) {
        self.specification = specification;
    }

    pub fn set_transform_config(&mut self, config: Option<TransformConfig>) {
        self.transform_config = config;
    }

    #[must_use]
    pub const fn specification(&self) -> Option<&Specification> {
        self.specification.as_ref()
    }

    #[must_use]
    pub const fn transform_config(&self) -> Option<&TransformConfig> {
        self.transform_config.as_ref()
    }

    /// Validate against the current specification.
    #[must_use]
    pub fn validate(&self, request: &FilterRequest) -> ValidationResult {
        validate(request, self.specification.as_ref())
    }

    /// Validate and build. The query is built even when validation fails; check
    /// `validation.is_valid()` before running it.
    #[must_use]
    pub fn build(&self, request: &FilterRequest) -> BuildResult {
        let validation = self.validate(request);
        if !validation.is_valid() {
            tracing::debug!(
                errors = validation.errors().len(),
                "Filter request failed validation"
            );
        }
        BuildResult {
            query: self.build_without_validation(request),
            validation,
        }
    }

    /// Compile and, when configured, transform.
    #[must_use]
    pub fn build_without_validation(&self, request: &FilterRequest) -> QueryOptions {
        let mut query = compile(request);
        if let Some(config) = &self.transform_config {
            query.where_clause = transform_where(&query.where_clause, config);
            query.order_by = transform_order(&query.order_by, config);
        }
        query.include.clone_from(&self.include);
        query.select.clone_from(&self.select);
        query
    }

    /// Build, failing when validation reports errors. Warnings are discarded.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::ValidationFailed` with every validation error.
    pub fn try_build(&self, request: &FilterRequest) -> Result<QueryOptions, QueryError> {
        let BuildResult { query, validation } = self.build(request);
        validation.into_result()?;
        Ok(query)
    }
}
