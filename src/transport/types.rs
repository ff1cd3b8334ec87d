//! Raw property types as decoded by the transport.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Declared CIM type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// Any of the sint/uint widths.
    Integer,
    Boolean,
    /// real32 / real64.
    Real,
    /// Array of any element type.
    Sequence,
    String,
    /// CIM datetime holding a point in time.
    DateTime,
    /// CIM datetime holding an interval.
    Interval,
    /// Object path pointing at another instance.
    Reference,
    /// Embedded object.
    Object,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Real => "real",
            Self::Sequence => "sequence",
            Self::String => "string",
            Self::DateTime => "datetime",
            Self::Interval => "interval",
            Self::Reference => "reference",
            Self::Object => "object",
        }
    }
}

/// A decoded, non-null property value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Bool(bool),
    Real(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Interval(Duration),
    /// WMI object path, e.g. `\\HV01\root\virtualization\v2:Msvm_VirtualSystemSettingData.InstanceID="..."`.
    Reference(String),
    Array(Vec<RawValue>),
}

/// A property as returned for one result instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    value: Option<RawValue>,
    cim_type: PropertyType,
}

impl PropertyValue {
    /// Creates a property of the given type.
    pub fn new(cim_type: PropertyType, value: Option<RawValue>) -> Self {
        Self { value, cim_type }
    }

    /// Creates a NULL property of the given type.
    pub fn null(cim_type: PropertyType) -> Self {
        Self::new(cim_type, None)
    }

    pub fn int(v: i64) -> Self {
        Self::new(PropertyType::Integer, Some(RawValue::Int(v)))
    }

    pub fn boolean(v: bool) -> Self {
        Self::new(PropertyType::Boolean, Some(RawValue::Bool(v)))
    }

    pub fn real(v: f64) -> Self {
        Self::new(PropertyType::Real, Some(RawValue::Real(v)))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::new(PropertyType::String, Some(RawValue::String(v.into())))
    }

    pub fn datetime(v: DateTime<Utc>) -> Self {
        Self::new(PropertyType::DateTime, Some(RawValue::DateTime(v)))
    }

    pub fn interval(v: Duration) -> Self {
        Self::new(PropertyType::Interval, Some(RawValue::Interval(v)))
    }

    pub fn reference(path: impl Into<String>) -> Self {
        Self::new(PropertyType::Reference, Some(RawValue::Reference(path.into())))
    }

    pub fn array(items: Vec<RawValue>) -> Self {
        Self::new(PropertyType::Sequence, Some(RawValue::Array(items)))
    }

    /// Returns the raw value, or `None` for NULL.
    pub fn value(&self) -> Option<&RawValue> {
        self.value.as_ref()
    }

    /// Returns the declared type.
    pub fn cim_type(&self) -> PropertyType {
        self.cim_type
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Returns true if the property is an object path.
    pub fn is_reference(&self) -> bool {
        self.cim_type == PropertyType::Reference
    }

    /// Returns the object path of a non-null reference.
    pub fn reference_path(&self) -> Option<&str> {
        match &self.value {
            Some(RawValue::Reference(path)) => Some(path),
            _ => None,
        }
    }
}

/// Properties of one result instance, in wire order.
pub type PropertySet = Vec<(String, PropertyValue)>;
