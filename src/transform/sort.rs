use serde_json::Value;

use super::config::TransformConfig;
use crate::filtering::OrderBy;

/// Rewrite a compiled sort the same way [`super::transform_where`] rewrites fields.
///
/// A relation-mapped key sorts by the relation's `nestedField`, or the renamed column;
/// a relation custom handler receives the direction as a string and its output is used
/// verbatim (`None` leaves the query unsorted). Unmapped keys are returned unchanged.
#[must_use]
pub fn transform_order(order_by: &OrderBy, config: &TransformConfig) -> OrderBy {
    let OrderBy::Field { field, rule } = order_by else {
        return order_by.clone();
    };
    let column = config.column_for(field, field);

    if let Some(relation) = config.field_mappings.get(field) {
        let handler = config.relation_handlers.get(field);
        if let Some(custom) = handler.and_then(|handler| handler.custom_handler.as_ref()) {
            return custom(&Value::String(rule.as_str().to_string()), column)
                .map_or(OrderBy::Unsorted, OrderBy::Custom);
        }
        let nested_field = handler
            .and_then(|handler| handler.nested_field.as_deref())
            .unwrap_or(column);
        return OrderBy::Relation {
            relation: relation.clone(),
            field: nested_field.to_string(),
            rule: rule.clone(),
        };
    }

    if config.field_name_mappings.contains_key(field) {
        return OrderBy::Field {
            field: column.to_string(),
            rule: rule.clone(),
        };
    }
    order_by.clone()
}
