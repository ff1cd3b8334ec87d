//! Normalization of raw transport values into [`Value`]s.

use crate::query::Value;
use crate::transport::{PropertyType, PropertyValue, RawValue};

/// Zero value substituted for a NULL of the given type, if one is registered.
fn null_default(cim_type: PropertyType) -> Value {
    match cim_type {
        PropertyType::Integer => Value::Int(0),
        PropertyType::Boolean => Value::Bool(false),
        PropertyType::Real => Value::Float(0.0),
        PropertyType::Sequence => Value::List(Vec::new()),
        _ => Value::Null,
    }
}

/// Converts one property into its normalized value.
///
/// Never fails: NULLs take their type's zero value (or stay NULL), datetimes
/// become epoch seconds, intervals become whole seconds and everything else
/// passes through.
pub fn coerce(prop: &PropertyValue) -> Value {
    match prop.value() {
        None => null_default(prop.cim_type()),
        Some(raw) => coerce_raw(raw),
    }
}

fn coerce_raw(raw: &RawValue) -> Value {
    match raw {
        RawValue::Int(i) => Value::Int(*i),
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::Real(f) => Value::Float(*f),
        RawValue::String(s) => Value::String(s.clone()),
        RawValue::DateTime(dt) => Value::Timestamp(dt.timestamp()),
        RawValue::Interval(d) => Value::Int(i64::try_from(d.as_secs()).unwrap_or(i64::MAX)),
        RawValue::Reference(path) => Value::String(path.clone()),
        RawValue::Array(items) => Value::List(items.iter().map(coerce_raw).collect()),
    }
}
