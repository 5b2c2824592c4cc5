use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::models::{FilterRequest, OrderRule};

/// Sort specification in the ORM's `orderBy` dialect. Multi-key ordering is not modeled.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrderBy {
    /// `{}`
    #[default]
    Unsorted,
    /// `{"<field>": "<rule>"}`
    Field { field: String, rule: OrderRule },
    /// `{"<relation>": {"<field>": "<rule>"}}`
    Relation {
        relation: String,
        field: String,
        rule: OrderRule,
    },
    /// Handler output, serialized verbatim
    Custom(Value),
}

impl OrderBy {
    #[must_use]
    pub const fn is_unsorted(&self) -> bool {
        matches!(self, Self::Unsorted)
    }
}

impl Serialize for OrderBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unsorted => serializer.serialize_map(Some(0))?.end(),
            Self::Field { field, rule } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(field, rule)?;
                map.end()
            }
            Self::Relation {
                relation,
                field,
                rule,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(relation, &std::collections::BTreeMap::from([(field, rule)]))?;
                map.end()
            }
            Self::Custom(value) => value.serialize(serializer),
        }
    }
}

/// Sort by `orderKey` (taken literally, dots included) using `orderRule`, defaulting to
/// ascending. No key means no ordering.
#[must_use]
pub fn parse_sorting(request: &FilterRequest) -> OrderBy {
    request
        .order_key
        .as_ref()
        .map_or(OrderBy::Unsorted, |key| OrderBy::Field {
            field: key.clone(),
            rule: request.order_rule.clone().unwrap_or_default(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_order_key_is_unsorted() {
        let order = parse_sorting(&FilterRequest::new());
        assert!(order.is_unsorted());
        assert_eq!(serde_json::to_value(&order).unwrap(), json!({}));
    }

    #[test]
    fn test_default_rule_is_asc() {
        let order = parse_sorting(&FilterRequest::new().order("createdAt", None));
        assert_eq!(serde_json::to_value(&order).unwrap(), json!({"createdAt": "asc"}));
    }

    #[test]
    fn test_dotted_key_is_kept_literally() {
        let order = parse_sorting(&FilterRequest::new().order("author.name", Some(OrderRule::Desc)));
        assert_eq!(serde_json::to_value(&order).unwrap(), json!({"author.name": "desc"}));
    }

    #[test]
    fn test_unrecognized_rule_passes_through() {
        let order = parse_sorting(
            &FilterRequest::new().order("title", Some(OrderRule::from("sideways"))),
        );
        assert_eq!(serde_json::to_value(&order).unwrap(), json!({"title": "sideways"}));
    }

    #[test]
    fn test_relation_order_serialization() {
        let order = OrderBy::Relation {
            relation: "author".into(),
            field: "name".into(),
            rule: OrderRule::Desc,
        };
        assert_eq!(serde_json::to_value(&order).unwrap(), json!({"author": {"name": "desc"}}));
    }
}
