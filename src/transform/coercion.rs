//! Value unwrapping and type coercion for transformed predicates.
//!
//! `None` anywhere in this module means "drop the field".

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Number, Value, json};

use super::config::{FieldType, FieldTypeHandler};
use crate::filtering::{Operator, Predicate};

/// Strip one layer of predicate wrapper from a JSON value.
///
/// `contains`, `equals` (recursively), `startsWith` and `endsWith` are recognized;
/// any other object yields its first value. Scalars and arrays are returned as-is.
fn unwrap_wrapper(value: &Value) -> Value {
    let Value::Object(object) = value else {
        return value.clone();
    };
    if let Some(inner) = object.get("contains") {
        return inner.clone();
    }
    if let Some(inner) = object.get("equals") {
        return unwrap_wrapper(inner);
    }
    if let Some(inner) = object.get("startsWith").or_else(|| object.get("endsWith")) {
        return inner.clone();
    }
    object.values().next().cloned().unwrap_or_else(|| value.clone())
}

/// The user's raw value behind a compiled predicate. Ranges become `{"gte", "lte"}`.
#[must_use]
pub fn raw_value(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::Equals(value) | Predicate::Custom(value) => unwrap_wrapper(value),
        Predicate::Contains(value) => value.clone(),
        Predicate::Compare { operator, value } if operator.wraps_raw_value() => {
            unwrap_wrapper(value)
        }
        Predicate::Compare { value, .. } => value.clone(),
        Predicate::Range { gte, lte } => json!({"gte": gte, "lte": lte}),
    }
}

/// Re-wrap a predicate according to its field's type handler.
#[must_use]
pub fn process(predicate: &Predicate, handler: Option<&FieldTypeHandler>) -> Option<Predicate> {
    if let Predicate::Range { gte, lte } = predicate {
        return process_range(gte, lte, handler);
    }
    process_raw(raw_value(predicate), handler)
}

fn process_raw(raw: Value, handler: Option<&FieldTypeHandler>) -> Option<Predicate> {
    let Some(handler) = handler else {
        return Some(default_predicate(raw));
    };
    if let Some(custom) = &handler.custom_handler {
        return custom(&raw).map(Predicate::Custom);
    }

    let operator = handler.operator;
    match handler.field_type {
        FieldType::Number => coerce_number(&raw)
            .map(|number| Predicate::compare(operator.unwrap_or(Operator::Equals), number)),
        FieldType::Boolean => Some(Predicate::compare(
            Operator::Equals,
            Value::Bool(coerce_boolean(&raw)),
        )),
        FieldType::Date => coerce_date(&raw)
            .map(|date| Predicate::compare(operator.unwrap_or(Operator::Equals), date)),
        FieldType::String => Some(Predicate::compare(
            operator.unwrap_or(Operator::Contains),
            raw,
        )),
        FieldType::Custom => Some(default_predicate(raw)),
    }
}

/// Strings search, objects pass through, everything else matches exactly.
fn default_predicate(raw: Value) -> Predicate {
    match raw {
        Value::String(_) => Predicate::Contains(raw),
        Value::Object(_) => Predicate::Custom(raw),
        _ => Predicate::compare(Operator::Equals, raw),
    }
}

fn process_range(gte: &Value, lte: &Value, handler: Option<&FieldTypeHandler>) -> Option<Predicate> {
    let Some(handler) = handler else {
        return Some(Predicate::Range {
            gte: gte.clone(),
            lte: lte.clone(),
        });
    };
    if let Some(custom) = &handler.custom_handler {
        return custom(&json!({"gte": gte, "lte": lte})).map(Predicate::Custom);
    }
    let coerce: fn(&Value) -> Option<Value> = match handler.field_type {
        FieldType::Number => coerce_number,
        FieldType::Date => coerce_date,
        FieldType::String | FieldType::Boolean | FieldType::Custom => keep,
    };
    Some(Predicate::Range {
        gte: coerce(gte)?,
        lte: coerce(lte)?,
    })
}

fn keep(value: &Value) -> Option<Value> {
    Some(value.clone())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number_value(number: f64) -> Option<Value> {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        return Some(Value::from(number as i64));
    }
    Number::from_f64(number).map(Value::Number)
}

/// Numeric value of a JSON value; `None` when it is not a finite number.
#[must_use]
pub fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::Bool(flag) => Some(Value::from(u8::from(*flag))),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .and_then(number_value)
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// `"true"` in any case is true, other strings are false; everything else by truthiness.
#[must_use]
pub fn coerce_boolean(value: &Value) -> bool {
    match value {
        Value::String(text) => text.eq_ignore_ascii_case("true"),
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A date as an RFC 3339 UTC string with millisecond precision. Numbers are epoch
/// milliseconds. `None` when the value is not a date.
#[must_use]
pub fn coerce_date(value: &Value) -> Option<Value> {
    let date = match value {
        Value::String(text) => parse_date(text)?,
        Value::Number(number) => DateTime::from_timestamp_millis(number.as_i64()?)?,
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => return None,
    };
    Some(Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)))
}
