use super::coercion::{process, raw_value};
use super::config::{RelationHandler, TransformConfig};
use crate::filtering::{Condition, Predicate};

/// Rewrite a compiled condition tree: rename fields, move them onto relations and
/// coerce their values.
///
/// `AND`/`OR` groups are walked at any depth. Fields that a handler drops are removed,
/// then groups left empty are removed. An empty root becomes [`Condition::MatchAll`]
/// (`{}`).
///
/// With an empty configuration the tree keeps its shape, but every scalar value is
/// re-wrapped in its default operator: a string `"x"` becomes `{"contains": "x"}` and
/// any other scalar `{"equals": value}`. Ranges are kept as they are.
#[must_use]
pub fn transform_where(condition: &Condition, config: &TransformConfig) -> Condition {
    transform_condition(condition, config, "").unwrap_or(Condition::MatchAll)
}

fn transform_group(
    entries: &[Condition],
    config: &TransformConfig,
    scope: &str,
) -> Option<Vec<Condition>> {
    let kept: Vec<Condition> = entries
        .iter()
        .filter_map(|entry| transform_condition(entry, config, scope))
        .collect();
    (!kept.is_empty()).then_some(kept)
}

/// `scope` is the dotted prefix of enclosing relations (`"author."`), used to build the
/// field path that configuration maps are keyed by.
fn transform_condition(
    condition: &Condition,
    config: &TransformConfig,
    scope: &str,
) -> Option<Condition> {
    match condition {
        Condition::And(entries) => transform_group(entries, config, scope).map(Condition::And),
        Condition::Or(entries) => transform_group(entries, config, scope).map(Condition::Or),
        Condition::Field { field, predicate } => {
            transform_field(&format!("{scope}{field}"), field, predicate, config)
        }
        Condition::Relation {
            relation,
            quantifier,
            condition,
        } => {
            let nested = transform_condition(condition, config, &format!("{scope}{relation}."))?;
            Some(Condition::Relation {
                relation: relation.clone(),
                quantifier: *quantifier,
                condition: Box::new(nested),
            })
        }
        Condition::Custom(value) => Some(Condition::Custom(value.clone())),
        Condition::MatchAll => None,
    }
}

fn transform_field(
    path: &str,
    field: &str,
    predicate: &Predicate,
    config: &TransformConfig,
) -> Option<Condition> {
    let column = config.column_for(path, field);
    let type_handler = config.field_type_handlers.get(path);

    let Some(relation) = config.field_mappings.get(path) else {
        let Some(processed) = process(predicate, type_handler) else {
            tracing::debug!(field = path, "Dropping field whose value could not be coerced");
            return None;
        };
        return Some(Condition::field(column, processed));
    };

    let relation_handler = config.relation_handlers.get(path);
    if let Some(custom) = relation_handler.and_then(|handler| handler.custom_handler.as_ref()) {
        let result = custom(&raw_value(predicate), column);
        if result.is_none() {
            tracing::debug!(field = path, relation = %relation, "Relation handler dropped field");
        }
        return result.map(Condition::Custom);
    }

    let Some(processed) = process(predicate, type_handler) else {
        tracing::debug!(field = path, "Dropping field whose value could not be coerced");
        return None;
    };
    Some(Condition::Relation {
        relation: relation.clone(),
        quantifier: relation_handler.and_then(RelationHandler::quantifier),
        condition: Box::new(Condition::field(column, processed)),
    })
}
